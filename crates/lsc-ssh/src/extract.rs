use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

use tracing::warn;

use crate::{END_MARKER, Error, Result, START_MARKER};

/// The user's part of the config at `path`, with any generated block removed.
///
/// A missing file yields empty content.
pub fn user_content(path: &Path) -> Result<Vec<u8>> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(source) => {
            return Err(Error::Read {
                path: path.to_path_buf(),
                source,
            });
        }
    };

    strip_generated(BufReader::new(file)).map_err(|source| Error::Read {
        path: path.to_path_buf(),
        source,
    })
}

/// Copy every line outside the marker pair, each terminated with `\n`.
/// Line endings are normalised: a trailing `\r\n` becomes `\n`.
///
/// A start marker without a matching end marker swallows the rest of the
/// input.
pub fn strip_generated<R: BufRead>(mut reader: R) -> io::Result<Vec<u8>> {
    let mut out = Vec::new();
    let mut line = Vec::new();
    let mut inside = false;

    loop {
        line.clear();
        if reader.read_until(b'\n', &mut line)? == 0 {
            break;
        }
        if line.last() == Some(&b'\n') {
            line.pop();
        }
        if line.last() == Some(&b'\r') {
            line.pop();
        }

        if !inside {
            if is_marker(&line, START_MARKER) {
                inside = true;
            } else {
                out.extend_from_slice(&line);
                out.push(b'\n');
            }
        } else if is_marker(&line, END_MARKER) {
            inside = false;
        }
    }

    if inside {
        warn!("generated block has no end marker; dropped everything after the start marker");
    }

    Ok(out)
}

fn is_marker(line: &[u8], marker: &str) -> bool {
    line == marker.as_bytes()
}
