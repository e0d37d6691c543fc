//! Rebinding of `:name` placeholders to the driver's positional style.

use entmap_data::Dialect;

/// A statement rewritten for a positional-parameter driver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Compiled {
    pub sql: String,
    /// Parameter names in bind order.
    pub binds: Vec<String>,
}

/// Rewrite `:name` placeholders.
///
/// Postgres gets `$n`, with a repeated name reusing its index; every other
/// dialect gets `?` and the name is bound once per occurrence. Quoted
/// literals and identifiers are copied verbatim and `::` casts are left alone.
pub fn compile(sql: &str, dialect: Dialect) -> Compiled {
    compile_with_casts(sql, dialect, |_| None)
}

/// Like [`compile`], appending `::<type>` to every Postgres placeholder for
/// which `cast` names a type. Other dialects ignore `cast`.
pub fn compile_with_casts(
    sql: &str,
    dialect: Dialect,
    cast: impl Fn(&str) -> Option<&'static str>,
) -> Compiled {
    let mut out = String::with_capacity(sql.len());
    let mut binds: Vec<String> = Vec::new();
    let mut chars = sql.char_indices().peekable();

    while let Some((idx, c)) = chars.next() {
        match c {
            '\'' | '"' | '`' => {
                out.push(c);
                for (_, inner) in chars.by_ref() {
                    out.push(inner);
                    if inner == c {
                        break;
                    }
                }
            }
            ':' if matches!(chars.peek(), Some((_, ':'))) => {
                out.push_str("::");
                chars.next();
            }
            ':' if matches!(chars.peek(), Some((_, n)) if is_name_start(*n)) => {
                let start = idx + 1;
                let mut end = start;
                while let Some((i, n)) = chars.peek().copied() {
                    if !is_name_char(n) {
                        break;
                    }
                    end = i + n.len_utf8();
                    chars.next();
                }
                let name = &sql[start..end];
                match dialect {
                    Dialect::Postgres => {
                        let pos = match binds.iter().position(|b| b == name) {
                            Some(pos) => pos,
                            None => {
                                binds.push(name.to_string());
                                binds.len() - 1
                            }
                        };
                        out.push('$');
                        out.push_str(&(pos + 1).to_string());
                        if let Some(ty) = cast(name) {
                            out.push_str("::");
                            out.push_str(ty);
                        }
                    }
                    _ => {
                        binds.push(name.to_string());
                        out.push('?');
                    }
                }
            }
            _ => out.push(c),
        }
    }

    Compiled { sql: out, binds }
}

fn is_name_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}
