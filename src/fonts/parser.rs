//! A small markup tokenizer able to read svg fonts.
//!
//! It does not build a document tree: an svg font is a flat list of
//! `<glyph>` elements under a `<font>`, so the tokenizer only returns the
//! start tags it meets along with their attributes, and skips everything
//! else.

use nom::branch::alt;
use nom::bytes::complete::{is_not, tag, take_until, take_while, take_while1};
use nom::character::complete::{char, multispace0, multispace1};
use nom::combinator::{opt, value};
use nom::multi::many0;
use nom::sequence::{delimited, preceded, separated_pair, terminated, tuple};
use nom::IResult;
use nom_locate::LocatedSpan;

use crate::fonts::error::{FontErrorKind, FontLoadError};

/// This type will allow us to know where we are while we're parsing the content.
pub type Span<'a> = LocatedSpan<&'a str>;

/// A position is a span but without the reference to the complete str.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Position {
    /// The line number of the position.
    pub line: u32,

    /// The column number of the position.
    pub column: usize,

    /// The offset from the beginning of the string.
    pub offset: usize,
}

/// Returns the position of a span.
pub fn position(span: &Span) -> Position {
    Position {
        line: span.location_line(),
        column: span.get_utf8_column(),
        offset: span.location_offset(),
    }
}

/// A start tag (or empty element tag) of the markup.
#[derive(Debug, Clone, PartialEq)]
pub struct Element<'a> {
    /// The name of the element, without namespace prefix.
    pub name: &'a str,

    /// The attributes of the element, with their values unescaped.
    pub attributes: Vec<(&'a str, String)>,

    /// Where the element starts.
    pub position: Position,
}

impl<'a> Element<'a> {
    /// Returns the value of an attribute if it is present.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| local_name(key) == name)
            .map(|(_, value)| value.as_str())
    }

    /// Parses a numeric attribute, falling back to `default` when absent.
    pub fn number(&self, name: &str, default: f64, content: &str) -> Result<f64, FontLoadError> {
        let raw = match self.attribute(name) {
            Some(raw) => raw,
            None => return Ok(default),
        };

        match raw.trim().parse::<f64>() {
            Ok(number) if number.is_finite() => Ok(number),
            _ => Err(FontLoadError::located(
                FontErrorKind::InvalidNumber {
                    attribute: name.to_owned(),
                    value: raw.to_owned(),
                },
                content,
                self.position,
            )),
        }
    }
}

/// What the tokenizer found at some point of the input.
#[derive(Debug, Clone, PartialEq)]
enum Node<'a> {
    /// A start tag, and whether it closes itself.
    Start(Element<'a>, bool),

    /// An end tag.
    End(&'a str, Position),

    /// Anything we don't care about: text, comments, declarations...
    Skipped,
}

type PResult<'a, T> = IResult<Span<'a>, T>;

/// Strips the namespace prefix of a name.
fn local_name(name: &str) -> &str {
    name.rsplit(':').next().unwrap_or(name)
}

fn name(input: Span) -> PResult<Span> {
    take_while1(|c: char| c.is_alphanumeric() || c == '-' || c == '_' || c == ':' || c == '.')(
        input,
    )
}

fn quoted(input: Span) -> PResult<Span> {
    alt((
        delimited(char('"'), take_while(|c: char| c != '"'), char('"')),
        delimited(char('\''), take_while(|c: char| c != '\''), char('\'')),
    ))(input)
}

fn attribute(input: Span) -> PResult<(Span, Span)> {
    preceded(
        multispace1,
        separated_pair(name, tuple((multispace0, char('='), multispace0)), quoted),
    )(input)
}

fn start_tag(input: Span) -> PResult<Node> {
    let start = position(&input);
    let (input, tag_name) = preceded(char('<'), name)(input)?;
    let (input, attributes) = many0(attribute)(input)?;
    let (input, empty) = terminated(preceded(multispace0, opt(char('/'))), char('>'))(input)?;

    let attributes = attributes
        .into_iter()
        .map(|(key, raw)| (*key.fragment(), unescape(raw.fragment())))
        .collect();

    Ok((
        input,
        Node::Start(
            Element {
                name: local_name(*tag_name.fragment()),
                attributes,
                position: start,
            },
            empty.is_some(),
        ),
    ))
}

fn end_tag(input: Span) -> PResult<Node> {
    let start = position(&input);
    let (input, tag_name) = delimited(tag("</"), name, preceded(multispace0, char('>')))(input)?;
    Ok((input, Node::End(local_name(*tag_name.fragment()), start)))
}

fn skipped(input: Span) -> PResult<Node> {
    value(
        Node::Skipped,
        alt((
            delimited(tag("<!--"), take_until("-->"), tag("-->")),
            delimited(tag("<![CDATA["), take_until("]]>"), tag("]]>")),
            delimited(tag("<?"), take_until("?>"), tag("?>")),
            delimited(tag("<!"), is_not(">"), char('>')),
            is_not("<"),
        )),
    )(input)
}

fn node(input: Span) -> PResult<Node> {
    alt((skipped, end_tag, start_tag))(input)
}

/// Returns every start tag of the content, in document order.
///
/// Every element must be closed, in the order it was opened.
pub fn elements(content: &str) -> Result<Vec<Element>, FontLoadError> {
    let input = Span::new(content);

    let (rest, nodes) = many0(node)(input).map_err(|_| {
        FontLoadError::located(FontErrorKind::Malformed, content, position(&input))
    })?;

    if !rest.fragment().is_empty() {
        return Err(FontLoadError::located(
            FontErrorKind::Malformed,
            content,
            position(&rest),
        ));
    }

    // The names of the elements that are not closed yet.
    let mut open: Vec<(&str, Position)> = vec![];
    let mut elements = vec![];

    for node in nodes {
        match node {
            Node::Start(element, empty) => {
                if !empty {
                    open.push((element.name, element.position));
                }
                elements.push(element);
            }
            Node::End(name, position) => match open.pop() {
                Some((expected, _)) if expected == name => (),
                _ => {
                    return Err(FontLoadError::located(
                        FontErrorKind::Malformed,
                        content,
                        position,
                    ))
                }
            },
            Node::Skipped => (),
        }
    }

    if let Some((_, position)) = open.last() {
        return Err(FontLoadError::located(
            FontErrorKind::Malformed,
            content,
            *position,
        ));
    }

    Ok(elements)
}

/// Replaces the xml character references of an attribute value.
pub fn unescape(raw: &str) -> String {
    let mut output = String::with_capacity(raw.len());
    let mut rest = raw;

    while let Some(start) = rest.find('&') {
        output.push_str(&rest[..start]);
        let tail = &rest[start..];

        match tail.find(';').and_then(|end| entity(&tail[1..end]).map(|c| (c, end))) {
            Some((c, end)) => {
                output.push(c);
                rest = &tail[end + 1..];
            }
            None => {
                output.push('&');
                rest = &tail[1..];
            }
        }
    }

    output.push_str(rest);
    output
}

/// Decodes the body of a character reference, `amp` or `#x41` for example.
fn entity(body: &str) -> Option<char> {
    let code = match body {
        "amp" => return Some('&'),
        "lt" => return Some('<'),
        "gt" => return Some('>'),
        "quot" => return Some('"'),
        "apos" => return Some('\''),
        _ => {
            if let Some(hex) = body.strip_prefix("#x").or_else(|| body.strip_prefix("#X")) {
                u32::from_str_radix(hex, 16).ok()?
            } else {
                body.strip_prefix('#')?.parse::<u32>().ok()?
            }
        }
    };

    std::char::from_u32(code)
}

/// Escapes a string so that it can be used as an attribute value.
pub fn escape(raw: &str) -> String {
    let mut output = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => output.push_str("&amp;"),
            '<' => output.push_str("&lt;"),
            '>' => output.push_str("&gt;"),
            '"' => output.push_str("&quot;"),
            c => output.push(c),
        }
    }
    output
}
