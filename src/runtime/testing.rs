use std::sync::Mutex;

use anyhow::Result;
use async_trait::async_trait;

use super::{CommandRunner, Invocation, ProcessOutput};

type Responder = Box<dyn Fn(&Invocation) -> Result<ProcessOutput> + Send + Sync>;

/// A runner that answers from a closure and records every invocation it sees
pub struct ScriptedRunner {
    respond: Responder,
    calls: Mutex<Vec<Invocation>>,
}

impl ScriptedRunner {
    pub fn new<F>(respond: F) -> Self
    where
        F: Fn(&Invocation) -> Result<ProcessOutput> + Send + Sync + 'static,
    {
        Self {
            respond: Box::new(respond),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<Invocation> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl CommandRunner for ScriptedRunner {
    async fn run(&self, invocation: &Invocation) -> Result<ProcessOutput> {
        self.calls.lock().unwrap().push(invocation.clone());
        (self.respond)(invocation)
    }
}

pub fn ok(stdout: &str) -> Result<ProcessOutput> {
    Ok(ProcessOutput {
        code: Some(0),
        stdout: stdout.to_string(),
        stderr: String::new(),
    })
}

pub fn exit(code: i32, stderr: &str) -> Result<ProcessOutput> {
    Ok(ProcessOutput {
        code: Some(code),
        stdout: String::new(),
        stderr: stderr.to_string(),
    })
}
