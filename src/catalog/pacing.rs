use std::io::{self, BufRead, Write};

/// Hook invoked by the scan after each processed message, with the
/// running count. Keeps progress output and the human-in-the-loop
/// checkpoint out of the pipeline itself, so non-interactive runs and
/// tests can substitute their own.
pub trait Pacer {
    fn processed(&mut self, count: usize);
}

/// Console pacer: a progress line every `progress_every` messages and a
/// blocking "press Enter" checkpoint every `checkpoint_every`. The
/// checkpoint has no timeout and no automatic resume.
pub struct ConsolePacer {
    progress_every: usize,
    checkpoint_every: usize,
    pause_enabled: bool,
}

impl ConsolePacer {
    pub fn new(progress_every: usize, checkpoint_every: usize, pause_enabled: bool) -> Self {
        Self {
            progress_every: progress_every.max(1),
            checkpoint_every: checkpoint_every.max(1),
            pause_enabled,
        }
    }
}

impl Pacer for ConsolePacer {
    fn processed(&mut self, count: usize) {
        if count % self.progress_every == 0 {
            println!("processed {count} messages");
        }
        if self.pause_enabled && count % self.checkpoint_every == 0 {
            print!("processed {count} messages, press Enter to continue... ");
            let _ = io::stdout().flush();
            let mut line = String::new();
            let _ = io::stdin().lock().read_line(&mut line);
        }
    }
}
