use std::fmt::Write as _;

use evx_types::{ExceptionValue, Frame, StackTrace};

/// Renders a stack trace the way the platform's own runtime prints it.
///
/// Frames are listed innermost first, except for Python which prints the
/// outermost call first and ends with the exception line.
pub fn raw_stacktrace_content(
    stacktrace: &StackTrace,
    platform: &str,
    exception: Option<&ExceptionValue>,
) -> String {
    let python = platform == "python";

    let mut lines: Vec<String> = stacktrace
        .frames
        .iter()
        .map(|frame| frame_line(frame, platform))
        .collect();
    if !python {
        lines.reverse();
    }

    if let Some(exception) = exception {
        let preamble = preamble(exception, platform);
        if python {
            lines.push(preamble);
        } else {
            lines.insert(0, preamble);
        }
    }

    lines.join("\n")
}

fn preamble(exception: &ExceptionValue, platform: &str) -> String {
    match platform {
        "java" => format!("Exception in thread \"main\" {}", java_summary(exception)),
        "ruby" => match (exception.ty.as_deref(), exception.value.as_deref()) {
            (Some(ty), Some(value)) => format!("{ty} ({value})"),
            _ => exception.summary(),
        },
        _ => exception.summary(),
    }
}

fn java_summary(exception: &ExceptionValue) -> String {
    match exception.module.as_deref().filter(|module| !module.is_empty()) {
        Some(module) => {
            let qualified = ExceptionValue {
                ty: Some(format!("{module}.{}", exception.ty.as_deref().unwrap_or("?"))),
                ..exception.clone()
            };
            qualified.summary()
        }
        None => exception.summary(),
    }
}

fn frame_line(frame: &Frame, platform: &str) -> String {
    let function = frame.function_name().unwrap_or("?");
    let filename = frame
        .file_name()
        .or(frame.abs_path.as_deref())
        .or_else(|| frame.module_name())
        .unwrap_or("?");

    let mut line = String::new();
    match platform {
        "python" => {
            let _ = write!(line, "  File \"{filename}\"");
            if let Some(line_no) = frame.line_no {
                let _ = write!(line, ", line {line_no}");
            }
            let _ = write!(line, ", in {function}");
            if let Some(context) = frame.context_line() {
                let _ = write!(line, "\n    {}", context.trim());
            }
        }
        "java" => {
            let _ = write!(line, "    at ");
            if let Some(module) = frame.module_name() {
                let _ = write!(line, "{module}.");
            }
            let file = frame.file_name().unwrap_or("Unknown Source");
            match frame.line_no {
                Some(line_no) => {
                    let _ = write!(line, "{function}({file}:{line_no})");
                }
                None => {
                    let _ = write!(line, "{function}({file})");
                }
            }
        }
        "ruby" => {
            let _ = write!(line, "    from {filename}");
            if let Some(line_no) = frame.line_no {
                let _ = write!(line, ":{line_no}");
            }
            let _ = write!(line, ":in '{function}'");
        }
        _ => {
            let _ = write!(line, "  at {function} ({filename}");
            if let Some(line_no) = frame.line_no {
                let _ = write!(line, ":{line_no}");
                if let Some(col_no) = frame.col_no {
                    let _ = write!(line, ":{col_no}");
                }
            }
            line.push(')');
        }
    }
    line
}
