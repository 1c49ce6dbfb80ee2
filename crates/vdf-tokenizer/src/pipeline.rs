//! Running the tokenizer on its own thread.
//!
//! The tokenizer thread sends tokens through a bounded channel, so a slow
//! consumer blocks the producer instead of letting tokens pile up. When the
//! input ends or fails the producer drops its sender, which ends iteration on
//! the consumer side. Dropping the [`TokenStream`] raises a flag the tokenizer
//! checks before every read from the source, so the producer stops even in the
//! middle of a token. A read already blocked in the source is waited out.

use std::io::{self, BufRead};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, SyncSender};
use std::thread::{self, Scope};

use tracing::debug;

use crate::{Token, Tokenizer};

/// Default number of tokens buffered between the tokenizer and its consumer.
pub const DEFAULT_QUEUE_CAPACITY: usize = 32;

/// Consuming end of a tokenizer thread.
pub struct TokenStream {
    rx: Receiver<Token>,
    cancelled: Arc<AtomicBool>,
}

impl Drop for TokenStream {
    fn drop(&mut self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }
}

impl Iterator for TokenStream {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        self.rx.recv().ok()
    }
}

/// Spawn `tokenizer` on a thread of `scope` and return the stream of its tokens.
///
/// The thread is joined when the scope ends.
pub fn spawn_tokenizer<'scope, R>(
    scope: &'scope Scope<'scope, '_>,
    tokenizer: Tokenizer<R>,
    capacity: usize,
) -> io::Result<TokenStream>
where
    R: BufRead + Send + 'scope,
{
    let (tx, rx) = mpsc::sync_channel(capacity);
    let cancelled = Arc::new(AtomicBool::new(false));
    let tokenizer = tokenizer.with_cancel(cancelled.clone());
    thread::Builder::new()
        .name("vdf-tokenizer".to_string())
        .spawn_scoped(scope, move || produce(tokenizer, tx))?;
    Ok(TokenStream { rx, cancelled })
}

fn produce<R: BufRead>(tokenizer: Tokenizer<R>, tx: SyncSender<Token>) {
    let file = tokenizer.file().cloned();
    debug!(?file, "tokenizer started");
    for token in tokenizer {
        if tx.send(token).is_err() {
            debug!(?file, "token consumer hung up, stopping tokenizer");
            return;
        }
    }
    debug!(?file, "tokenizer finished");
}
