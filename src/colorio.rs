// Copyright 2018 Peter Williams <peter@newton.cx>
// Licensed under the MIT License.

/*! Colorized CLI output.

Output goes through a `ColorIo`, normally with the `cprint!` family of
macros, which name a style by a short identifier: `green`, `hl`, `pl`,
`red`, or `yellow`.

*/

use failure::Error;
use pbs::PbsError;
use std::fmt;
use std::io::Write;
use std::str::FromStr;
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};


/// How to style some text to print.
///
/// Instead of using this type directly, use the `cprint!` family of macros.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Style {
    /// Style some text with a green color; used for accepted values.
    Green,

    /// Style some text with a bold, bright color.
    Highlight,

    /// Style some text in the standard plain way.
    Plain,

    /// Style some text with a red color; used for rejections and errors.
    Red,

    /// Style some text with a yellow color; used for unset or unordered
    /// values.
    Yellow,
}


/// Which stream to print to.
///
/// Instead of using this type directly, use the `cprint!` family of macros.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Stream {
    /// Print to standard error.
    Stderr,

    /// Print to standard output.
    Stdout,
}


macro_rules! style {
    (green) => { $crate::colorio::Style::Green };
    (hl) => { $crate::colorio::Style::Highlight };
    (pl) => { $crate::colorio::Style::Plain };
    (red) => { $crate::colorio::Style::Red };
    (yellow) => { $crate::colorio::Style::Yellow };
}

macro_rules! cprint {
    ($cio:expr, $style:ident, $($fmt_args:expr),*) => {
        $cio.print_core($crate::colorio::Stream::Stdout, style!($style), format_args!($($fmt_args),*))
    };
}

macro_rules! cprintln {
    ($cio:expr, $style:ident, $($fmt_args:expr),*) => {
        cprint!($cio, $style, $($fmt_args),*);
        cprint!($cio, pl, "\n");
    };
}

macro_rules! ecprint {
    ($cio:expr, $style:ident, $($fmt_args:expr),*) => {
        $cio.print_core($crate::colorio::Stream::Stderr, style!($style), format_args!($($fmt_args),*))
    };
}

macro_rules! ecprintln {
    ($cio:expr, $style:ident, $($fmt_args:expr),*) => {
        ecprint!($cio, $style, $($fmt_args),*);
        ecprint!($cio, pl, "\n");
    };
}


/// The `--color` setting.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ColorWhen {
    Auto,
    Always,
    Never,
}

#[derive(Debug, Fail)]
#[fail(display = "expected \"auto\", \"always\", or \"never\"; got \"{}\"", _0)]
pub struct BadColorChoice(String);

impl FromStr for ColorWhen {
    type Err = BadColorChoice;

    fn from_str(s: &str) -> Result<ColorWhen, BadColorChoice> {
        match s {
            "auto" => Ok(ColorWhen::Auto),
            "always" => Ok(ColorWhen::Always),
            "never" => Ok(ColorWhen::Never),
            other => Err(BadColorChoice(other.to_owned())),
        }
    }
}

impl From<ColorWhen> for ColorChoice {
    fn from(w: ColorWhen) -> ColorChoice {
        match w {
            ColorWhen::Auto => ColorChoice::Auto,
            ColorWhen::Always => ColorChoice::Always,
            ColorWhen::Never => ColorChoice::Never,
        }
    }
}


/// State needed for our colorized I/O.
pub struct ColorIo {
    stdout: StandardStream,
    stderr: StandardStream,
    red: ColorSpec,
    green: ColorSpec,
    highlight: ColorSpec,
    yellow: ColorSpec,
}


impl ColorIo {
    pub fn new(choice: ColorChoice) -> Self {
        let stdout = StandardStream::stdout(choice);
        let stderr = StandardStream::stderr(choice);

        let mut green = ColorSpec::new();
        green.set_fg(Some(Color::Green)).set_bold(true);

        let mut highlight = ColorSpec::new();
        highlight.set_bold(true);

        let mut red = ColorSpec::new();
        red.set_fg(Some(Color::Red)).set_bold(true);

        let mut yellow = ColorSpec::new();
        yellow.set_fg(Some(Color::Yellow)).set_bold(true);

        ColorIo { stdout, stderr, green, highlight, red, yellow }
    }

    /// Print an error and its causes. If the root cause is a batch-system
    /// error, its numeric code is shown too.
    pub fn print_error(&mut self, err: Error) {
        let mut first = true;

        for cause in err.iter_chain() {
            if first {
                ecprint!(self, red, "error:");
                first = false;
            } else {
                ecprint!(self, pl, "  ");
                ecprint!(self, red, "caused by:");
            }

            ecprintln!(self, pl, " {}", cause);
        }

        if let Some(pe) = err.find_root_cause().downcast_ref::<PbsError>() {
            ecprint!(self, pl, "  ");
            ecprint!(self, yellow, "code:");
            ecprintln!(self, pl, " {}", pe.code());
        }
    }

    /// Print formatted arguments to one of the output streams.
    ///
    /// Use the `cprint!` macros instead of this function.
    #[inline(always)]
    pub fn print_core(&mut self, stream: Stream, style: Style, args: fmt::Arguments) {
        let stream = match stream {
            Stream::Stderr => &mut self.stderr,
            Stream::Stdout => &mut self.stdout,
        };

        let spec = match style {
            Style::Green => Some(&self.green),
            Style::Highlight => Some(&self.highlight),
            Style::Plain => None,
            Style::Red => Some(&self.red),
            Style::Yellow => Some(&self.yellow),
        };

        if let Some(spec) = spec {
            let _r = stream.set_color(spec);
        }

        let _r = write!(stream, "{}", args);

        if spec.is_some() {
            let _r = stream.reset();
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_style_names() {
        assert_eq!(style!(green), Style::Green);
        assert_eq!(style!(hl), Style::Highlight);
        assert_eq!(style!(pl), Style::Plain);
        assert_eq!(style!(red), Style::Red);
        assert_eq!(style!(yellow), Style::Yellow);
    }

    #[test]
    fn color_choices() {
        assert_eq!("never".parse::<ColorWhen>().unwrap(), ColorWhen::Never);
        assert!("sometimes".parse::<ColorWhen>().is_err());
    }
}
