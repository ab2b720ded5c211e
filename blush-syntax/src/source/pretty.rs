// This file is part of blush, a bash-leaning POSIX shell.
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! Formatting diagnostics that point into source code
//!
//! A [`Message`] pairs a title with annotated source snippets and renders
//! through `annotate-snippets`. Error types across the workspace convert
//! themselves into messages via [`MessageBase`].

use super::Location;
use std::borrow::Cow;

/// Severity of a message or annotation
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum AnnotationType {
    Error,
    Warning,
    Info,
}

/// Part of source code annotated with a label
#[derive(Clone, Debug)]
pub struct Annotation<'a> {
    /// Severity of this annotation
    pub r#type: AnnotationType,
    /// Label attached to the annotated range
    pub label: Cow<'a, str>,
    /// Position of the annotated range
    pub location: &'a Location,
}

/// Self-contained diagnostic message
#[derive(Clone, Debug)]
pub struct Message<'a> {
    /// Overall severity
    pub r#type: AnnotationType,
    /// Headline of the message
    pub title: Cow<'a, str>,
    /// Annotated source ranges
    pub annotations: Vec<Annotation<'a>>,
}

/// Types that can present themselves as a diagnostic message
pub trait MessageBase {
    /// Severity of the message (defaults to `Error`)
    fn message_type(&self) -> AnnotationType {
        AnnotationType::Error
    }

    /// Headline of the message
    fn message_title(&self) -> Cow<'_, str>;

    /// The annotation pointing at the main location
    fn main_annotation(&self) -> Annotation<'_>;
}

impl<'a, T: MessageBase> From<&'a T> for Message<'a> {
    fn from(base: &'a T) -> Self {
        Message {
            r#type: base.message_type(),
            title: base.message_title(),
            annotations: vec![base.main_annotation()],
        }
    }
}

impl From<AnnotationType> for annotate_snippets::Level<'_> {
    fn from(r#type: AnnotationType) -> Self {
        match r#type {
            AnnotationType::Error => Self::ERROR,
            AnnotationType::Warning => Self::WARNING,
            AnnotationType::Info => Self::INFO,
        }
    }
}

impl From<AnnotationType> for annotate_snippets::AnnotationKind {
    fn from(r#type: AnnotationType) -> Self {
        match r#type {
            AnnotationType::Error | AnnotationType::Warning => Self::Primary,
            AnnotationType::Info => Self::Context,
        }
    }
}

impl<'a> From<&'a Message<'a>> for annotate_snippets::Group<'a> {
    fn from(message: &'a Message<'a>) -> Self {
        annotate_snippets::Level::from(message.r#type)
            .primary_title(&*message.title)
            .elements(message.annotations.iter().map(|annotation| {
                let code = &*annotation.location.code;
                let line_start = code
                    .start_line_number
                    .get()
                    .try_into()
                    .unwrap_or(usize::MAX);
                annotate_snippets::Snippet::source(&*code.value)
                    .line_start(line_start)
                    .path(code.source.label())
                    .annotation(
                        annotate_snippets::AnnotationKind::from(annotation.r#type)
                            .span(annotation.location.range.clone())
                            .label(&annotation.label),
                    )
            }))
    }
}

/// Renders a message to a plain (uncolored) string.
#[must_use]
pub fn render(message: &Message<'_>) -> String {
    let group = annotate_snippets::Group::from(message);
    annotate_snippets::Renderer::plain()
        .render(&[group])
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rendered_message_contains_title_and_label() {
        let location = Location::dummy("echo )");
        let location = location.with_range(5..6);
        let message = Message {
            r#type: AnnotationType::Error,
            title: "syntax error".into(),
            annotations: vec![Annotation {
                r#type: AnnotationType::Error,
                label: "unexpected token".into(),
                location: &location,
            }],
        };
        let rendered = render(&message);
        assert!(rendered.contains("syntax error"), "{rendered}");
        assert!(rendered.contains("unexpected token"), "{rendered}");
    }
}
