// Copyright (C) 2026  Caprica Software Limited
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! Error types.

/// Errors raised while building a registry or talking to its storage.
///
/// Pin operations themselves never fail, only the edges do.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("media item has no usable `id` field")]
    MissingId,

    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("snapshot serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("configuration error: {0}")]
    Config(#[from] confy::ConfyError),

    #[error("background store worker has stopped")]
    WorkerStopped,
}

pub type Result<T> = std::result::Result<T, Error>;
