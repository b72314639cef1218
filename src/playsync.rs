// Copyright (C) 2026 Michael Wilson <mike@mdwn.dev>
//
// This program is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License as published by the Free Software
// Foundation, version 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//

use std::sync::Arc;

use tokio::sync::watch;

/// Represents the current cancel state.
#[derive(Debug, Clone, Copy, PartialEq)]
enum CancelState {
    Untouched,
    Cancelled,
}

/// A cancel handle is handed to a running task. It's the task's responsibility to check it
/// between units of work and to stop promptly once it's cancelled.
#[derive(Clone)]
pub struct CancelHandle {
    state: Arc<watch::Sender<CancelState>>,
}

impl Default for CancelHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl CancelHandle {
    /// Creates a new cancel handle.
    pub fn new() -> CancelHandle {
        let (state, _) = watch::channel(CancelState::Untouched);
        CancelHandle {
            state: Arc::new(state),
        }
    }

    /// Returns true if the task has been cancelled.
    pub fn is_cancelled(&self) -> bool {
        *self.state.borrow() == CancelState::Cancelled
    }

    /// Resolves once the handle is cancelled. Resolves immediately if it already is.
    pub async fn cancelled(&self) {
        let mut receiver = self.state.subscribe();
        // The sender lives as long as self, so this can't fail.
        let _ = receiver
            .wait_for(|state| *state == CancelState::Cancelled)
            .await;
    }

    /// Cancel the task.
    pub fn cancel(&self) {
        self.state.send_if_modified(|state| {
            if *state == CancelState::Untouched {
                *state = CancelState::Cancelled;
                true
            } else {
                false
            }
        });
    }
}
