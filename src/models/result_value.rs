use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display};

/// Verdict for an outcome once it has been compared to what was expected.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, AsRefStr, Display)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum ResultValue {
    Ok,
    Fail,
    Ignore,
}
