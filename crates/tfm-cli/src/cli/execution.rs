use clap::ValueEnum;
use tfm_api::ExecutionMode;

/// `--execution-mode` values.
#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum ExecutionModeArg {
    Remote,
    Local,
    Agent,
}

impl From<ExecutionModeArg> for ExecutionMode {
    fn from(arg: ExecutionModeArg) -> Self {
        match arg {
            ExecutionModeArg::Remote => Self::Remote,
            ExecutionModeArg::Local => Self::Local,
            ExecutionModeArg::Agent => Self::Agent,
        }
    }
}
