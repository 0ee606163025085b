use std::io::{self, BufRead, Write};

use poolify::shared::Prompt;
use tokio::{
    runtime::Handle,
    sync::{Mutex, mpsc},
    task,
};

/// Lines typed on stdin, read on a dedicated thread so the runtime never blocks on them.
pub struct Input {
    lines: Mutex<mpsc::UnboundedReceiver<String>>,
}

impl Input {
    pub fn spawn() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        std::thread::spawn(move || {
            for line in io::stdin().lock().lines() {
                let Ok(line) = line else {
                    break;
                };
                if tx.send(line).is_err() {
                    break;
                }
            }
        });
        Self {
            lines: Mutex::new(rx),
        }
    }

    /// `None` once stdin is closed.
    pub async fn next_line(&self) -> Option<String> {
        self.lines.lock().await.recv().await
    }

    pub async fn ask(&self, question: &str) -> Option<String> {
        print!("{question} ");
        let _ = io::stdout().flush();
        self.next_line().await
    }
}

impl Prompt for Input {
    fn confirm(&self, message: &str) -> bool {
        print!("{message} [y/N] ");
        let _ = io::stdout().flush();
        let answer = task::block_in_place(|| Handle::current().block_on(self.next_line()));
        matches!(
            answer.as_deref().map(str::trim).map(str::to_ascii_lowercase).as_deref(),
            Some("y" | "yes")
        )
    }
}
