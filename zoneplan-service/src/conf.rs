use serde::Deserialize;

#[derive(Deserialize, Debug, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub optimizer: Optimizer,
    #[serde(default)]
    pub staging: Staging,
}

#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Spawn `command` as a child process.
    Process,
    /// Run the engine on a thread of this process.
    Embedded,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct Optimizer {
    pub mode: Mode,
    pub command: String,
    /// Wall-clock limit for a whole run in seconds.
    pub timeout: u64,
    pub policy: String,
}

impl Default for Optimizer {
    fn default() -> Self {
        Self {
            mode: Mode::Embedded,
            command: "./axis-optimizer".into(),
            timeout: 15,
            policy: "exclusion-distance".into(),
        }
    }
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct Staging {
    pub dir: String,
}

impl Default for Staging {
    fn default() -> Self {
        Self { dir: ".".into() }
    }
}
