//! Path normalization for group prefixes.

/// Returns the canonical form of `p`, eliminating `.` and `..` elements.
///
/// The following rules are applied iteratively until no further processing can
/// be done:
///  1. Replace multiple slashes with a single slash.
///  2. Eliminate each `.` path name element (the current directory).
///  3. Eliminate each inner `..` path name element (the parent directory)
///     along with the non-`..` element that precedes it.
///  4. Eliminate `..` elements that begin a rooted path:
///     that is, replace `/..` by `/` at the beginning of a path.
///
/// A trailing slash is preserved. If the result of this process is an empty
/// string, `/` is returned.
pub fn clean_path(p: &str) -> String {
    if p.is_empty() {
        return "/".to_owned();
    }

    let p = p.as_bytes();
    let n = p.len();
    let mut buf: Vec<u8> = Vec::with_capacity(n + 1);
    buf.push(b'/');

    // reading from `p`; `r` is the index of the next byte to process
    let mut r = usize::from(p[0] == b'/');
    let mut trailing = n > 1 && p[n - 1] == b'/';

    while r < n {
        match p[r] {
            // empty path element, trailing slash is added after the end
            b'/' => r += 1,
            b'.' if r + 1 == n => {
                trailing = true;
                r += 1;
            }
            // `.` element
            b'.' if p[r + 1] == b'/' => r += 2,
            // `..` element: remove to last '/'
            b'.' if p[r + 1] == b'.' && (r + 2 == n || p[r + 2] == b'/') => {
                r += 3;
                if buf.len() > 1 {
                    buf.pop();
                    while buf.len() > 1 && buf[buf.len() - 1] != b'/' {
                        buf.pop();
                    }
                    if buf.len() > 1 {
                        buf.pop();
                    }
                }
            }
            _ => {
                // real path element, add a slash if needed
                if buf.len() > 1 {
                    buf.push(b'/');
                }

                while r < n && p[r] != b'/' {
                    buf.push(p[r]);
                    r += 1;
                }
            }
        }
    }

    // re-append trailing slash
    if trailing && buf.len() > 1 {
        buf.push(b'/');
    }

    // only ASCII bytes were removed, so the rest is still valid UTF-8
    String::from_utf8_lossy(&buf).into_owned()
}

/// Joins a group prefix and a relative route path into one clean path.
pub fn join(prefix: &str, relative: &str) -> String {
    if relative.is_empty() {
        return clean_path(prefix);
    }

    clean_path(&format!("{prefix}/{relative}"))
}
