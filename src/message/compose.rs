//! Template composition: variable substitution plus final validation.
//!
//! Composition is the last line of defense before a tree reaches the
//! dispatcher's wire format, so the checks here run even when the editor
//! already validated the template. The pass is pure; it never touches the
//! execution context.

use super::{
    Bubble, BoxComponent, ButtonAction, Component, MessageTree, MAX_CAROUSEL_BUBBLES,
    is_valid_color,
};
use crate::error::CompositionError;
use crate::value::Value;
use ahash::AHashMap;

/// Renders a template against the context variables and validates the result.
///
/// `{{name}}` references in every text-bearing field are replaced with the
/// variable's rendered value; a missing variable substitutes an empty string
/// rather than failing, since a cosmetic gap must not break message delivery.
/// Structural and domain violations, by contrast, are hard errors.
pub fn compose(
    template: &MessageTree,
    variables: &AHashMap<String, Value>,
) -> Result<MessageTree, CompositionError> {
    let mut tree = template.clone();
    match &mut tree {
        MessageTree::Bubble(bubble) => substitute_bubble(bubble, variables),
        MessageTree::Carousel { contents } => {
            for bubble in contents.iter_mut() {
                substitute_bubble(bubble, variables);
            }
        }
    }
    validate_tree(&tree)?;
    Ok(tree)
}

/// Replaces `{{key}}` references in a single string.
///
/// Unterminated braces are kept verbatim; substituted values are not
/// re-scanned, so a variable holding `{{x}}` cannot expand further.
pub fn substitute(text: &str, variables: &AHashMap<String, Value>) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        match after.find("}}") {
            Some(end) => {
                let key = after[..end].trim();
                if let Some(value) = variables.get(key) {
                    out.push_str(&value.render());
                }
                rest = &after[end + 2..];
            }
            None => {
                out.push_str(&rest[start..]);
                return out;
            }
        }
    }
    out.push_str(rest);
    out
}

fn substitute_bubble(bubble: &mut Bubble, variables: &AHashMap<String, Value>) {
    for section in [&mut bubble.header, &mut bubble.footer] {
        if let Some(b) = section {
            substitute_box(b, variables);
        }
    }
    substitute_box(&mut bubble.body, variables);
}

fn substitute_box(container: &mut BoxComponent, variables: &AHashMap<String, Value>) {
    for child in container.contents.iter_mut() {
        match child {
            Component::Box(b) => substitute_box(b, variables),
            Component::Text(t) => t.text = substitute(&t.text, variables),
            Component::Span(s) => s.text = substitute(&s.text, variables),
            Component::Image(i) => i.url = substitute(&i.url, variables),
            Component::Icon(i) => i.url = substitute(&i.url, variables),
            Component::Video(v) => {
                v.url = substitute(&v.url, variables);
                v.preview_url = substitute(&v.preview_url, variables);
            }
            Component::Button(b) => {
                b.label = substitute(&b.label, variables);
                match &mut b.action {
                    ButtonAction::Postback { data } => *data = substitute(data, variables),
                    ButtonAction::Message { text } => *text = substitute(text, variables),
                    ButtonAction::Uri { uri } => *uri = substitute(uri, variables),
                }
            }
            Component::Separator(_) => {}
        }
    }
}

fn validate_tree(tree: &MessageTree) -> Result<(), CompositionError> {
    match tree {
        MessageTree::Bubble(bubble) => validate_bubble(bubble),
        MessageTree::Carousel { contents } => {
            if contents.is_empty() {
                return Err(CompositionError::EmptyCarousel);
            }
            if contents.len() > MAX_CAROUSEL_BUBBLES {
                return Err(CompositionError::CarouselTooLarge {
                    count: contents.len(),
                    max: MAX_CAROUSEL_BUBBLES,
                });
            }
            contents.iter().try_for_each(validate_bubble)
        }
    }
}

fn validate_bubble(bubble: &Bubble) -> Result<(), CompositionError> {
    for section in [&bubble.header, &bubble.footer].into_iter().flatten() {
        validate_box(section)?;
    }
    validate_box(&bubble.body)
}

fn validate_box(container: &BoxComponent) -> Result<(), CompositionError> {
    if container.contents.is_empty() {
        return Err(CompositionError::EmptyBox);
    }
    for child in &container.contents {
        match child {
            Component::Box(b) => validate_box(b)?,
            Component::Text(t) => check_color("text", &t.color)?,
            Component::Span(s) => check_color("span", &s.color)?,
            Component::Separator(s) => check_color("separator", &s.color)?,
            Component::Image(i) => check_url("image", &i.url)?,
            Component::Icon(i) => check_url("icon", &i.url)?,
            Component::Video(v) => {
                check_url("video", &v.url)?;
                if v.preview_url.is_empty() {
                    return Err(CompositionError::EmptyField {
                        component: "video",
                        field: "preview_url",
                    });
                }
            }
            Component::Button(b) => {
                check_color("button", &b.color)?;
                if b.label.is_empty() {
                    return Err(CompositionError::EmptyField {
                        component: "button",
                        field: "label",
                    });
                }
                if let ButtonAction::Uri { uri } = &b.action {
                    if uri.is_empty() {
                        return Err(CompositionError::EmptyField {
                            component: "button",
                            field: "uri",
                        });
                    }
                }
            }
        }
    }
    Ok(())
}

fn check_color(
    component: &'static str,
    color: &Option<String>,
) -> Result<(), CompositionError> {
    match color {
        Some(value) if !is_valid_color(value) => Err(CompositionError::InvalidColor {
            component,
            value: value.clone(),
        }),
        _ => Ok(()),
    }
}

fn check_url(component: &'static str, url: &str) -> Result<(), CompositionError> {
    if url.is_empty() {
        Err(CompositionError::EmptyField {
            component,
            field: "url",
        })
    } else {
        Ok(())
    }
}
