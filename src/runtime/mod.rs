mod process;
#[cfg(test)]
pub(crate) mod testing;

pub use process::{CommandRunner, Invocation, ProcessOutput, SystemRunner};
