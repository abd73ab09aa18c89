// Copyright 2026 the Lucent Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Error types.

use core::fmt;

use crate::id::Sequence;

/// Errors returned by [`Compositor`](crate::compositor::Compositor) operations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Error<E> {
    /// The service connection failed.
    Service(E),
    /// Another compositing manager already redirects the display.
    AnotherCompositor {
        /// Sequence of the rejected redirection request.
        sequence: Sequence,
    },
}

impl<E: fmt::Display> fmt::Display for Error<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Service(e) => write!(f, "service failure: {e}"),
            Self::AnotherCompositor { sequence } => {
                write!(f, "another composite manager is already running (request {sequence})")
            }
        }
    }
}

impl<E: fmt::Debug + fmt::Display> core::error::Error for Error<E> {}

/// Protocol error code, named where the compositor knows it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// Bad request code.
    Request,
    /// Integer parameter out of range.
    Value,
    /// Window does not exist.
    Window,
    /// Pixmap does not exist.
    Pixmap,
    /// Atom does not exist.
    Atom,
    /// Parameter mismatch.
    Match,
    /// Drawable does not exist.
    Drawable,
    /// Access denied.
    Access,
    /// Out of server memory.
    Alloc,
    /// Identifier already in use or out of range.
    IdChoice,
    /// Server implementation limit.
    Implementation,
    /// XFixes: region does not exist.
    BadRegion,
    /// Damage: damage object does not exist.
    BadDamage,
    /// Render: picture format does not exist.
    BadPictFormat,
    /// Render: picture does not exist.
    BadPicture,
    /// Render: bad compositing operator.
    BadPictOp,
    /// Render: glyph set does not exist.
    BadGlyphSet,
    /// Render: glyph does not exist.
    BadGlyph,
    /// Any other code.
    Other(u8),
}

impl ErrorCode {
    /// Symbolic name used in log output.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Request => "BadRequest",
            Self::Value => "BadValue",
            Self::Window => "BadWindow",
            Self::Pixmap => "BadPixmap",
            Self::Atom => "BadAtom",
            Self::Match => "BadMatch",
            Self::Drawable => "BadDrawable",
            Self::Access => "BadAccess",
            Self::Alloc => "BadAlloc",
            Self::IdChoice => "BadIDChoice",
            Self::Implementation => "BadImplementation",
            Self::BadRegion => "BadRegion",
            Self::BadDamage => "BadDamage",
            Self::BadPictFormat => "BadPictFormat",
            Self::BadPicture => "BadPicture",
            Self::BadPictOp => "BadPictOp",
            Self::BadGlyphSet => "BadGlyphSet",
            Self::BadGlyph => "BadGlyph",
            Self::Other(_) => "unknown",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Other(code) => write!(f, "error {code}"),
            named => f.write_str(named.name()),
        }
    }
}

/// An asynchronous failure of a previously issued request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ProtocolError {
    /// Sequence of the failed request.
    pub sequence: Sequence,
    /// What went wrong.
    pub code: ErrorCode,
    /// Major opcode of the failed request.
    pub major_opcode: u8,
    /// Minor opcode of the failed request (extension requests).
    pub minor_opcode: u16,
}

impl fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} request {} minor {} serial {}",
            self.code, self.major_opcode, self.minor_opcode, self.sequence
        )
    }
}
