use crate::value::Value;

/// A segment in a resolved path query.
///
/// Queries are parsed into a flat list of segments which the resolver
/// walks against a document.
#[derive(Debug, Clone, PartialEq)]
pub enum Segment {
    /// Object field access by name
    ///
    /// # Examples
    /// - `$.name` → `Field("name")`
    /// - `$.user.email` → `[Field("user"), Field("email")]`
    Field(String),

    /// Array element access by index
    ///
    /// # Examples
    /// - `$[0]` → `Index(0)`
    /// - `$.items[-1]` → `[Field("items"), Index(-1)]` (negative counts from the end)
    Index(i64),

    /// Wildcard over a list: `$[*].height` applies the remaining path to
    /// every element and yields the list of matches in order.
    Wildcard,

    /// Slice of a list: `$[0:2]`. Either bound may be omitted; bounds are
    /// clamped to the list length. Negative bounds count from the end.
    Slice(Option<i64>, Option<i64>),
}

/// A parsed path query: a sequence of segments applied from the root.
pub type Path = Vec<Segment>;

/// Errors raised by path parsing and resolution.
#[derive(Debug, Clone, PartialEq)]
pub enum PathError {
    /// The query string does not parse as a path at all
    Invalid(String),

    /// The query is well-formed but matched nothing in the document
    NotFound(String),
}

impl std::fmt::Display for PathError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathError::Invalid(msg) => write!(f, "Invalid path: {}", msg),
            PathError::NotFound(msg) => write!(f, "Path not found: {}", msg),
        }
    }
}

impl std::error::Error for PathError {}

struct PathParser {
    input: Vec<char>,
    position: usize,
}

impl PathParser {
    fn new(input: &str) -> Self {
        PathParser {
            input: input.chars().collect(),
            position: 0,
        }
    }

    fn current_char(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    fn advance(&mut self) {
        self.position += 1;
    }

    fn read_field(&mut self) -> String {
        let mut result = String::new();
        while let Some(ch) = self.current_char() {
            if ch == '.' || ch == '[' {
                break;
            }
            result.push(ch);
            self.advance();
        }
        result
    }

    fn read_integer(&mut self) -> Result<i64, PathError> {
        let mut number = String::new();
        if self.current_char() == Some('-') {
            number.push('-');
            self.advance();
        }
        while let Some(ch) = self.current_char() {
            if ch.is_ascii_digit() {
                number.push(ch);
                self.advance();
            } else {
                break;
            }
        }
        number
            .parse::<i64>()
            .map_err(|_| PathError::Invalid(format!("expected integer, got '{}'", number)))
    }

    /// Parse one `[...]` group: index, wildcard, or slice.
    fn read_bracket(&mut self) -> Result<Segment, PathError> {
        self.advance(); // consume '['

        if self.current_char() == Some('*') {
            self.advance();
            return match self.current_char() {
                Some(']') => {
                    self.advance();
                    Ok(Segment::Wildcard)
                }
                _ => Err(PathError::Invalid("expected ']' after '*'".into())),
            };
        }

        // Slice with omitted start: [:n]
        if self.current_char() == Some(':') {
            self.advance();
            let end = if self.current_char() == Some(']') {
                None
            } else {
                Some(self.read_integer()?)
            };
            return match self.current_char() {
                Some(']') => {
                    self.advance();
                    Ok(Segment::Slice(None, end))
                }
                _ => Err(PathError::Invalid("unterminated slice".into())),
            };
        }

        let first = self.read_integer()?;

        match self.current_char() {
            Some(']') => {
                self.advance();
                Ok(Segment::Index(first))
            }
            Some(':') => {
                self.advance();
                let end = if self.current_char() == Some(']') {
                    None
                } else {
                    Some(self.read_integer()?)
                };
                match self.current_char() {
                    Some(']') => {
                        self.advance();
                        Ok(Segment::Slice(Some(first), end))
                    }
                    _ => Err(PathError::Invalid("unterminated slice".into())),
                }
            }
            Some(ch) => Err(PathError::Invalid(format!(
                "unexpected '{}' inside brackets",
                ch
            ))),
            None => Err(PathError::Invalid("unterminated bracket access".into())),
        }
    }

    fn parse(&mut self) -> Result<Path, PathError> {
        if self.input.is_empty() {
            return Err(PathError::Invalid("empty query".into()));
        }

        let mut segments = Vec::new();

        // Leading '$' is the root; a path used relative to a sub-document
        // may omit it and start with a bare field.
        if self.current_char() == Some('$') {
            self.advance();
        } else if self.current_char() != Some('.') && self.current_char() != Some('[') {
            let field = self.read_field();
            if field.is_empty() {
                return Err(PathError::Invalid("empty field name".into()));
            }
            segments.push(Segment::Field(field));
        }

        while let Some(ch) = self.current_char() {
            match ch {
                '.' => {
                    self.advance();
                    let field = self.read_field();
                    if field.is_empty() {
                        return Err(PathError::Invalid("empty field name after '.'".into()));
                    }
                    segments.push(Segment::Field(field));
                }
                '[' => segments.push(self.read_bracket()?),
                _ => {
                    return Err(PathError::Invalid(format!(
                        "unexpected '{}' at position {}",
                        ch, self.position
                    )));
                }
            }
        }

        Ok(segments)
    }
}

/// Parse a query string into a path without evaluating it.
pub fn parse(query: &str) -> Result<Path, PathError> {
    PathParser::new(query).parse()
}

/// Whether a string is syntactically a path query: `$`-prefixed and parseable.
///
/// Used by the builder sugar to decide whether a bare string argument is an
/// input path or a literal; the evaluator itself never calls this.
pub fn is_path(query: &str) -> bool {
    query.starts_with('$') && parse(query).is_ok()
}

/// Resolve a query against a document.
///
/// A query that matches nothing is a hard [`PathError::NotFound`], never a
/// `Null` result; optional output is expressed at the Record/Tuple level
/// instead.
pub fn resolve(value: &Value, query: &str) -> Result<Value, PathError> {
    let path = parse(query)?;
    resolve_path(value, &path)
}

/// Resolve an already-parsed path against a document.
pub fn resolve_path(value: &Value, path: &[Segment]) -> Result<Value, PathError> {
    let Some(segment) = path.first() else {
        return Ok(value.clone());
    };
    let rest = &path[1..];

    match (value, segment) {
        (Value::Object(map), Segment::Field(key)) => match map.get(key) {
            Some(child) => resolve_path(child, rest),
            None => Err(PathError::NotFound(format!("no field '{}'", key))),
        },
        (Value::Array(arr), Segment::Index(idx)) => {
            let index = normalize_index(*idx, arr.len()).ok_or_else(|| {
                PathError::NotFound(format!(
                    "index {} out of bounds (length {})",
                    idx,
                    arr.len()
                ))
            })?;
            resolve_path(&arr[index], rest)
        }
        (Value::Array(arr), Segment::Wildcard) => collect_matches(arr.iter(), rest),
        (Value::Array(arr), Segment::Slice(start, end)) => {
            let (from, to) = slice_bounds(*start, *end, arr.len());
            if rest.is_empty() {
                Ok(Value::Array(arr[from..to].to_vec()))
            } else {
                collect_matches(arr[from..to].iter(), rest)
            }
        }
        (other, segment) => Err(PathError::NotFound(format!(
            "cannot apply {:?} to {}",
            segment,
            other.type_name()
        ))),
    }
}

/// Apply the tail path to each element, keeping the matches in order.
/// Elements where the tail misses are skipped; zero matches is a miss.
fn collect_matches<'a>(
    elements: impl Iterator<Item = &'a Value>,
    rest: &[Segment],
) -> Result<Value, PathError> {
    let mut matches = Vec::new();
    for element in elements {
        match resolve_path(element, rest) {
            Ok(v) => matches.push(v),
            Err(PathError::NotFound(_)) => {}
            Err(e) => return Err(e),
        }
    }
    if matches.is_empty() {
        return Err(PathError::NotFound("wildcard matched nothing".into()));
    }
    Ok(Value::Array(matches))
}

fn normalize_index(idx: i64, len: usize) -> Option<usize> {
    let index = if idx < 0 {
        let abs = idx.unsigned_abs() as usize;
        if abs > len {
            return None;
        }
        len - abs
    } else {
        idx as usize
    };
    if index < len { Some(index) } else { None }
}

fn slice_bounds(start: Option<i64>, end: Option<i64>, len: usize) -> (usize, usize) {
    let clamp = |bound: i64| -> usize {
        if bound < 0 {
            len.saturating_sub(bound.unsigned_abs() as usize)
        } else {
            (bound as usize).min(len)
        }
    };
    let from = start.map(clamp).unwrap_or(0);
    let to = end.map(clamp).unwrap_or(len);
    (from, to.max(from))
}
