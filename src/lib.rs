//! Single-pass classification of byte streams as ASCII, UTF-8, Latin-1 or
//! unknown.
//!
//! The classifier keeps two hypotheses alive while it scans, one for UTF-8
//! and one for Latin-1, and resolves them into a [`Verdict`] once the input
//! is exhausted. It needs no look-ahead and a few bytes of state, so input
//! can be fed in chunks of any size.
//!
//! ```
//! use latin1sniff::{classify, Verdict};
//!
//! assert_eq!(classify(b"Hi"), Verdict::Ascii);
//! assert_eq!(classify(&[0xC3, 0xA9]), Verdict::Utf8);
//! assert_eq!(classify(&[0xE9]), Verdict::Latin1);
//! assert_eq!(classify(&[0x80]), Verdict::Unknown);
//! ```

use encoding_rs::Encoding;
use encoding_rs::UTF_8;
use encoding_rs::WINDOWS_1252;
use std::fmt;
use std::io;
use std::io::Read;

// 10xxxxxx
const TRAILER_MASK: u8 = 0xC0;
const TRAILER_BITS: u8 = 0x80;

// 110xxxxx
const LEADER_2_MASK: u8 = 0xE0;
const LEADER_2_BITS: u8 = 0xC0;

// 1110xxxx
const LEADER_3_MASK: u8 = 0xF0;
const LEADER_3_BITS: u8 = 0xE0;

// 11110xxx
const LEADER_4_MASK: u8 = 0xF8;
const LEADER_4_BITS: u8 = 0xF0;

/// First byte that is printable in Latin-1. Everything from 0x80 up to this
/// is a C1 control and rules Latin-1 out.
const LATIN1_PRINTABLE_START: u8 = 0xA0;

/// The UTF-8 role of a single byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteClass {
    /// `0xxxxxxx`
    Ascii,
    /// `10xxxxxx`
    Continuation,
    /// First byte of a multi-byte sequence, carrying the number of
    /// continuation bytes that must follow (1 to 3).
    Leader(u8),
    /// `11111xxx`
    Invalid,
}

impl ByteClass {
    pub fn of(b: u8) -> ByteClass {
        if b < 0x80 {
            ByteClass::Ascii
        } else if b & TRAILER_MASK == TRAILER_BITS {
            ByteClass::Continuation
        } else if b & LEADER_2_MASK == LEADER_2_BITS {
            ByteClass::Leader(1)
        } else if b & LEADER_3_MASK == LEADER_3_BITS {
            ByteClass::Leader(2)
        } else if b & LEADER_4_MASK == LEADER_4_BITS {
            ByteClass::Leader(3)
        } else {
            ByteClass::Invalid
        }
    }
}

/// The outcome of classifying one input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verdict {
    /// No byte at or above 0x80 was seen.
    Ascii,
    /// Non-ASCII content that is well-formed UTF-8 with no sequence left
    /// dangling at the end.
    Utf8,
    /// Not UTF-8, but free of C1 controls.
    Latin1,
    Unknown,
}

impl Verdict {
    /// The label printed for this verdict.
    pub fn as_str(self) -> &'static str {
        match self {
            Verdict::Ascii => "ASCII",
            Verdict::Utf8 => "UTF8",
            Verdict::Latin1 => "Latin1",
            Verdict::Unknown => "Unknown",
        }
    }

    /// An encoding that decodes the classified bytes without errors, if
    /// there is one.
    ///
    /// Latin-1 maps to windows-1252, which is what the `iso-8859-1` label
    /// resolves to. The two only disagree on 0x80–0x9F, and a `Latin1`
    /// verdict rules those bytes out.
    pub fn encoding(self) -> Option<&'static Encoding> {
        match self {
            Verdict::Ascii | Verdict::Utf8 => Some(UTF_8),
            Verdict::Latin1 => Some(WINDOWS_1252),
            Verdict::Unknown => None,
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

#[derive(Debug, Clone, Default)]
struct Utf8Candidate {
    pending_trailers: u8,
}

impl Utf8Candidate {
    /// Returns `false` once the input can no longer be UTF-8.
    fn feed(&mut self, class: ByteClass) -> bool {
        match class {
            ByteClass::Ascii => {
                // A sequence cut short by an ASCII byte.
                if self.pending_trailers != 0 {
                    return false;
                }
            }
            ByteClass::Continuation => {
                if self.pending_trailers == 0 {
                    return false;
                }
                self.pending_trailers -= 1;
            }
            ByteClass::Leader(trailers) => {
                if self.pending_trailers != 0 {
                    return false;
                }
                self.pending_trailers = trailers;
            }
            ByteClass::Invalid => {
                return false;
            }
        }
        true
    }

    fn at_boundary(&self) -> bool {
        self.pending_trailers == 0
    }
}

/// Streaming classifier for one input.
///
/// Feed it the input in as many chunks as convenient and ask for the
/// [`Verdict`] at the end. A classifier is meant for a single input; use a
/// fresh one for the next.
#[derive(Debug, Clone)]
pub struct EncodingClassifier {
    utf8: Option<Utf8Candidate>,
    latin1_valid: bool,
    non_ascii_seen: bool,
}

impl EncodingClassifier {
    pub fn new() -> Self {
        EncodingClassifier {
            utf8: Some(Utf8Candidate::default()),
            latin1_valid: true,
            non_ascii_seen: false,
        }
    }

    fn feed_byte(&mut self, b: u8) {
        let class = ByteClass::of(b);
        if class != ByteClass::Ascii {
            self.non_ascii_seen = true;
            if b < LATIN1_PRINTABLE_START {
                self.latin1_valid = false;
            }
        }
        if let Some(candidate) = self.utf8.as_mut() {
            if !candidate.feed(class) {
                self.utf8 = None;
            }
        }
    }

    /// ASCII only matters when it interrupts a multi-byte sequence.
    fn ascii_is_inert(&self) -> bool {
        self.utf8.as_ref().map_or(true, Utf8Candidate::at_boundary)
    }

    /// Feeds the next chunk of input. Returns `true` if a non-ASCII byte has
    /// been seen so far.
    pub fn feed(&mut self, buffer: &[u8]) -> bool {
        let mut i = 0;
        while i < buffer.len() {
            if self.ascii_is_inert() {
                i += Encoding::ascii_valid_up_to(&buffer[i..]);
                if i == buffer.len() {
                    break;
                }
            }
            self.feed_byte(buffer[i]);
            i += 1;
        }
        self.non_ascii_seen
    }

    /// Resolves the input fed so far into a verdict.
    ///
    /// A multi-byte sequence still waiting for continuation bytes counts
    /// against UTF-8 here even though no malformed byte was seen.
    pub fn verdict(&self) -> Verdict {
        if !self.non_ascii_seen {
            return Verdict::Ascii;
        }
        if let Some(candidate) = &self.utf8 {
            if candidate.at_boundary() {
                return Verdict::Utf8;
            }
        }
        if self.latin1_valid {
            Verdict::Latin1
        } else {
            Verdict::Unknown
        }
    }
}

impl Default for EncodingClassifier {
    fn default() -> Self {
        Self::new()
    }
}

/// Lets `io::copy` stream straight into the classifier.
impl io::Write for EncodingClassifier {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.feed(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Classifies a complete input.
pub fn classify(bytes: &[u8]) -> Verdict {
    let mut classifier = EncodingClassifier::new();
    classifier.feed(bytes);
    classifier.verdict()
}

/// Classifies everything `reader` yields until it is exhausted.
///
/// Errors only come from the reader; the classification itself cannot fail.
pub fn classify_reader<R: Read>(mut reader: R) -> io::Result<Verdict> {
    let mut classifier = EncodingClassifier::new();
    let len = io::copy(&mut reader, &mut classifier)?;
    let verdict = classifier.verdict();
    tracing::trace!(len, %verdict, "classified stream");
    Ok(verdict)
}
