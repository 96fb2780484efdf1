//! Submitted-form binding and validation.
//!
//! Forms accept raw strings and only hand out validated payloads; a
//! failed validation carries per-field messages for redisplay and never
//! reaches the store.

use crate::model::group::Slug;
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Raw post submission: text plus optional group slug and image path.
#[derive(Clone, Eq, PartialEq, Debug, Default, Hash, Deserialize, Serialize)]
pub struct PostForm {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub group: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
}

/// A validated [`PostForm`]; the group is still a slug and needs to be
/// resolved against the store before persisting.
#[derive(Clone, Eq, PartialEq, Debug, Default, Hash)]
pub struct PostInput {
    pub text: String,
    pub group: Option<Slug>,
    pub image: Option<String>,
}

#[derive(Clone, Eq, PartialEq, Debug, Default, Hash, Deserialize, Serialize)]
pub struct CommentForm {
    #[serde(default)]
    pub text: String,
}

#[derive(Clone, Eq, PartialEq, Debug, Default, Hash)]
pub struct CommentInput {
    pub text: String,
}

#[derive(Clone, Eq, PartialEq, Debug, Default, Hash, Serialize)]
#[serde(transparent)]
pub struct FormErrors(Vec<FieldError>);

impl std::error::Error for FormErrors {}

#[derive(Clone, Eq, PartialEq, Debug, Hash, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: &'static str,
}

impl FormErrors {
    #[must_use]
    pub fn single(field: &'static str, message: &'static str) -> Self {
        Self(vec![FieldError { field, message }])
    }

    #[must_use]
    pub fn errors(&self) -> &[FieldError] {
        &self.0
    }

    fn push(&mut self, field: &'static str, message: &'static str) {
        self.0.push(FieldError { field, message });
    }

    fn into_result<T>(self, value: T) -> Result<T, FormErrors> {
        if self.0.is_empty() { Ok(value) } else { Err(self) }
    }
}

impl Display for FormErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Form validation failed:")?;
        for error in &self.0 {
            write!(f, " [{}: {}]", error.field, error.message)?;
        }
        Ok(())
    }
}

impl PostForm {
    pub fn validate(self) -> Result<PostInput, FormErrors> {
        let mut errors = FormErrors::default();

        let text = self.text.trim().to_owned();
        if text.is_empty() {
            errors.push("text", "Post text must not be empty");
        }

        let group = match self.group {
            Some(raw) => match Slug::new(raw) {
                Ok(slug) => Some(slug),
                Err(_) => {
                    errors.push("group", "Not a valid group slug");
                    None
                }
            },
            None => None,
        };

        errors.into_result(PostInput {
            text,
            group,
            image: self.image,
        })
    }

    #[must_use]
    pub fn descriptor() -> FormDescriptor {
        FormDescriptor {
            fields: vec![
                FieldDescriptor {
                    name: "text",
                    label: "Post text",
                    help_text: "What do you want to tell the community?",
                },
                FieldDescriptor {
                    name: "group",
                    label: "Group",
                    help_text: "Pick a group, or leave the post without one",
                },
                FieldDescriptor {
                    name: "image",
                    label: "Image",
                    help_text: "Attach a picture to the publication",
                },
            ],
        }
    }
}

impl CommentForm {
    pub fn validate(self) -> Result<CommentInput, FormErrors> {
        let mut errors = FormErrors::default();

        let text = self.text.trim().to_owned();
        if text.is_empty() {
            errors.push("text", "Comment text must not be empty");
        }

        errors.into_result(CommentInput { text })
    }

    #[must_use]
    pub fn descriptor() -> FormDescriptor {
        FormDescriptor {
            fields: vec![FieldDescriptor {
                name: "text",
                label: "Comment text",
                help_text: "What do you want to tell the author?",
            }],
        }
    }
}

/// Blank-form metadata served on form GET routes.
#[derive(Clone, Eq, PartialEq, Debug, Serialize)]
pub struct FormDescriptor {
    pub fields: Vec<FieldDescriptor>,
}

#[derive(Clone, Eq, PartialEq, Debug, Serialize)]
pub struct FieldDescriptor {
    pub name: &'static str,
    pub label: &'static str,
    pub help_text: &'static str,
}

#[cfg(test)]
mod tests {
    use crate::forms::{CommentForm, PostForm};

    #[test]
    fn empty_post_text_fails() {
        for text in ["", "   ", "\n\t"] {
            let errors = PostForm {
                text: text.to_owned(),
                ..PostForm::default()
            }
            .validate()
            .unwrap_err();

            assert_eq!(errors.errors().len(), 1);
            assert_eq!(errors.errors()[0].field, "text");
        }
    }

    #[test]
    fn group_and_image_are_optional() {
        let input = PostForm {
            text: "New post".to_owned(),
            group: None,
            image: None,
        }
        .validate()
        .unwrap();

        assert_eq!(input.text, "New post");
        assert_eq!(input.group, None);
        assert_eq!(input.image, None);
    }

    #[test]
    fn valid_post_maps_all_fields() {
        let input = PostForm {
            text: "  New post  ".to_owned(),
            group: Some("test_slug".to_owned()),
            image: Some("posts/small.gif".to_owned()),
        }
        .validate()
        .unwrap();

        assert_eq!(input.text, "New post");
        assert_eq!(input.group.unwrap().get(), "test_slug");
        assert_eq!(input.image.as_deref(), Some("posts/small.gif"));
    }

    #[test]
    fn invalid_group_slug_is_a_field_error() {
        let errors = PostForm {
            text: "New post".to_owned(),
            group: Some(String::new()),
            image: None,
        }
        .validate()
        .unwrap_err();

        assert_eq!(errors.errors()[0].field, "group");
    }

    #[test]
    fn empty_comment_text_fails() {
        assert!(CommentForm { text: " ".to_owned() }.validate().is_err());

        let input = CommentForm {
            text: "Nice post".to_owned(),
        }
        .validate()
        .unwrap();
        assert_eq!(input.text, "Nice post");
    }
}
