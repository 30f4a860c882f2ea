/*
 * Krill, a UCI-compatible chess move generator
 * Copyright (C) 2025 Jasper Shovelton
 *
 * Krill is free software: you can redistribute it and/or modify it under the
 * terms of the GNU General Public License as published by the Free Software
 * Foundation, either version 3 of the License, or (at your option) any later
 * version.
 *
 * Krill is distributed in the hope that it will be useful, but WITHOUT ANY
 * WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
 * FOR A PARTICULAR PURPOSE. See the GNU General Public License for more
 * details.
 *
 * You should have received a copy of the GNU General Public License along with
 * Krill. If not, see <https://www.gnu.org/licenses/>.
 */

//! Error handling.

use std::fmt::{self, Display, Formatter};

/// An error that occurs when a string cannot be parsed.
#[allow(clippy::enum_variant_names)]
#[derive(Debug, Eq, PartialEq)]
pub enum ParseError {
    /// A token was outside an expected range.
    ErroneousToken,
    /// Expected a token but found nothing.
    ExpectedToken,
    /// Expected a different token.
    InvalidToken,
}

impl Display for ParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::ErroneousToken => write!(f, "token outside the expected range"),
            Self::ExpectedToken => write!(f, "expected a token but found nothing"),
            Self::InvalidToken => write!(f, "expected a different token"),
        }
    }
}

impl std::error::Error for ParseError {}
