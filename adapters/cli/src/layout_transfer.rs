#![allow(clippy::missing_errors_doc)]

use base64::{engine::general_purpose::STANDARD_NO_PAD, Engine as _};
use isleweave_core::{CellPos, GridSpec, Layout, ResolvedCell};
use serde::{Deserialize, Serialize};
use thiserror::Error;

const CODE_DOMAIN: &str = "isle";
const CODE_VERSION: &str = "v1";

/// Identifier prefix emitted before the encoded layout payload.
pub(crate) const CODE_HEADER: &str = "isle:v1";
/// Delimiter used to separate the prefix, cell count and payload.
const FIELD_DELIMITER: char = ':';

/// A resolved layout plus the grid it was generated on, as shared between
/// hosts and clients that do not regenerate from the seed.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub(crate) struct LayoutCode {
    /// Grid the layout was generated on.
    pub(crate) grid: GridSpec,
    /// Resolved cells in creation order.
    pub(crate) cells: Vec<ResolvedCell>,
}

impl LayoutCode {
    pub(crate) fn new(grid: GridSpec, layout: &Layout) -> Self {
        Self {
            grid,
            cells: layout.cells().to_vec(),
        }
    }

    pub(crate) fn into_layout(self) -> Layout {
        Layout::new(self.cells)
    }

    /// Encodes the layout into a single-line string suitable for clipboard transfer.
    pub(crate) fn encode(&self) -> Result<String, LayoutTransferError> {
        let json = serde_json::to_vec(self).map_err(LayoutTransferError::Encode)?;
        let encoded = STANDARD_NO_PAD.encode(json);
        Ok(format!("{CODE_HEADER}:{}:{encoded}", self.cells.len()))
    }

    /// Decodes a layout from the provided string representation.
    pub(crate) fn decode(value: &str) -> Result<Self, LayoutTransferError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(LayoutTransferError::EmptyPayload);
        }

        let mut parts = trimmed.split(FIELD_DELIMITER);
        let domain = parts.next().ok_or(LayoutTransferError::MissingPrefix)?;
        let version = parts.next().ok_or(LayoutTransferError::MissingVersion)?;
        let count = parts.next().ok_or(LayoutTransferError::MissingCount)?;
        let payload = parts.next().ok_or(LayoutTransferError::MissingPayload)?;

        if domain != CODE_DOMAIN {
            return Err(LayoutTransferError::InvalidPrefix(domain.to_owned()));
        }
        if version != CODE_VERSION {
            return Err(LayoutTransferError::UnsupportedVersion(version.to_owned()));
        }
        if let Some(extra) = parts.next() {
            return Err(LayoutTransferError::TrailingSegment(extra.to_owned()));
        }

        let expected = count
            .trim()
            .parse::<usize>()
            .map_err(|_| LayoutTransferError::InvalidCount(count.to_owned()))?;
        let bytes = STANDARD_NO_PAD
            .decode(payload.as_bytes())
            .map_err(LayoutTransferError::InvalidEncoding)?;
        let decoded: Self =
            serde_json::from_slice(&bytes).map_err(LayoutTransferError::InvalidPayload)?;

        if decoded.cells.len() != expected {
            return Err(LayoutTransferError::CountMismatch {
                expected,
                found: decoded.cells.len(),
            });
        }
        if decoded.grid.side() == 0 {
            return Err(LayoutTransferError::EmptyGrid);
        }
        if let Some(cell) = decoded
            .cells
            .iter()
            .find(|cell| !decoded.grid.is_valid_cell(cell.position))
        {
            return Err(LayoutTransferError::CellOutOfBounds(cell.position));
        }
        Ok(decoded)
    }
}

/// Errors that can occur while encoding or decoding layout codes.
#[derive(Debug, Error)]
pub(crate) enum LayoutTransferError {
    /// The provided string was empty or contained only whitespace.
    #[error("layout code was empty")]
    EmptyPayload,
    /// The prefix segment was missing.
    #[error("layout code is missing the prefix")]
    MissingPrefix,
    /// The version segment was missing.
    #[error("layout code is missing the version")]
    MissingVersion,
    /// The cell count segment was missing.
    #[error("layout code is missing the cell count")]
    MissingCount,
    /// The payload segment was missing.
    #[error("layout code is missing the payload")]
    MissingPayload,
    /// The code used an unexpected prefix.
    #[error("layout prefix '{0}' is not supported")]
    InvalidPrefix(String),
    /// The code used an unsupported version identifier.
    #[error("layout version '{0}' is not supported")]
    UnsupportedVersion(String),
    /// The code carried more segments than the format defines.
    #[error("unexpected trailing segment '{0}' in layout code")]
    TrailingSegment(String),
    /// The cell count could not be parsed.
    #[error("could not parse cell count '{0}'")]
    InvalidCount(String),
    /// The payload held a different number of cells than the header announced.
    #[error("layout code announces {expected} cells but carries {found}")]
    CountMismatch {
        /// Count announced by the header.
        expected: usize,
        /// Cells present in the payload.
        found: usize,
    },
    /// The payload declared a grid without cells.
    #[error("layout grid has no cells")]
    EmptyGrid,
    /// A cell lies outside the grid the payload declared.
    #[error("layout cell ({}, {}) lies outside the grid", .0.x(), .0.y())]
    CellOutOfBounds(CellPos),
    /// The base64 payload could not be decoded.
    #[error("could not decode layout payload: {0}")]
    InvalidEncoding(#[source] base64::DecodeError),
    /// The decoded payload could not be deserialised.
    #[error("could not parse layout payload: {0}")]
    InvalidPayload(#[source] serde_json::Error),
    /// The layout could not be serialised.
    #[error("could not serialise layout: {0}")]
    Encode(#[source] serde_json::Error),
}
