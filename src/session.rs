// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

/// Who the current invocation acts for. Built once in `main` and handed to
/// every store call; nothing reads the user from ambient state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub user: String,
}

pub const DEFAULT_USER: &str = "default";

impl Session {
    pub fn new(user: impl Into<String>) -> Self {
        let user = user.into();
        let user = user.trim();
        Session {
            user: if user.is_empty() {
                DEFAULT_USER.to_string()
            } else {
                user.to_string()
            },
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Session::new(DEFAULT_USER)
    }
}
