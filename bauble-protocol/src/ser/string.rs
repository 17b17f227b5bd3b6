use std::io::{Read, Result};

use bauble_utils::{codec::VarInt, serial::read_length};

/// Hard limit on the byte length of any string field.
pub const MAX_STRING_BYTES: usize = 32767 * 3;

/// Reads a `VarInt`-prefixed string and cuts it down to `max_chars` characters.
///
/// Invalid UTF-8 is replaced rather than rejected and oversized strings are
/// truncated, so a sloppy peer does not lose its connection over a label.
pub fn read_truncated_string(data: &mut impl Read, max_chars: usize) -> Result<String> {
    let len = read_length::<VarInt>(data, MAX_STRING_BYTES)?;
    let mut buf = vec![0; len];
    data.read_exact(&mut buf)?;

    let mut string = String::from_utf8_lossy(&buf).into_owned();
    if let Some((cut, _)) = string.char_indices().nth(max_chars) {
        log::debug!("Truncating {len} byte string to {max_chars} characters");
        string.truncate(cut);
    }
    Ok(string)
}
