use evx_types::{Frame, StackTrace};

/// Picks the frame that best summarizes a stack trace.
///
/// Without system frames the innermost (last) frame wins. With system frames
/// the innermost in-app frame wins, falling back to the last frame when no
/// frame is in-app. Returns `None` only for an empty trace.
pub fn select_relevant_frame(stacktrace: &StackTrace) -> Option<&Frame> {
    let last = stacktrace.frames.last();
    if !stacktrace.has_system_frames {
        return last;
    }

    stacktrace
        .frames
        .iter()
        .rev()
        .find(|frame| frame.in_app)
        .or(last)
}
