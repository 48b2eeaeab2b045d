//! The form shared by the create and edit category pages.

use maud::{Markup, html};
use serde::{Deserialize, Serialize};

use crate::{
    category::{
        Category, CategoryUpdate, NewCategory,
        domain::{MAX_DESCRIPTION_LENGTH, MAX_ICON_LENGTH, MAX_NAME_LENGTH},
    },
    html::{BUTTON_PRIMARY_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, loading_spinner},
};

/// Form data for category creation and editing.
///
/// Blank optional inputs are submitted as empty strings and parsed as `None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CategoryFormData {
    pub name: String,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub color: Option<String>,
}

impl From<CategoryFormData> for NewCategory {
    fn from(form: CategoryFormData) -> Self {
        NewCategory {
            name: form.name,
            description: form.description,
            icon: form.icon,
            color: form.color,
        }
    }
}

impl From<CategoryFormData> for CategoryUpdate {
    /// Every input is on the form, so a blank input clears the stored value.
    fn from(form: CategoryFormData) -> Self {
        CategoryUpdate {
            name: Some(form.name),
            description: Some(form.description),
            icon: Some(form.icon),
            color: Some(form.color),
        }
    }
}

impl From<&Category> for CategoryFormData {
    fn from(category: &Category) -> Self {
        CategoryFormData {
            name: category.name.clone(),
            description: category.description.clone(),
            icon: category.icon.clone(),
            color: category.color.clone(),
        }
    }
}

/// How the form is submitted.
pub enum FormMethod {
    Post,
    Put,
}

pub fn category_form_view(
    method: FormMethod,
    endpoint: &str,
    values: &CategoryFormData,
    error_message: Option<&str>,
    submit_label: &str,
) -> Markup {
    let (hx_post, hx_put) = match method {
        FormMethod::Post => (Some(endpoint), None),
        FormMethod::Put => (None, Some(endpoint)),
    };

    html! {
        form
            hx-post=[hx_post]
            hx-put=[hx_put]
            hx-swap="outerHTML"
            hx-target-error="#alert-container"
            hx-indicator="#indicator"
            class="w-full space-y-4 md:space-y-6"
        {
            div
            {
                label for="name" class=(FORM_LABEL_STYLE) { "Name" }

                input
                    id="name"
                    type="text"
                    name="name"
                    placeholder="Category Name"
                    value=(values.name)
                    maxlength=(MAX_NAME_LENGTH)
                    required
                    autofocus
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                label for="description" class=(FORM_LABEL_STYLE) { "Description" }

                input
                    id="description"
                    type="text"
                    name="description"
                    placeholder="What belongs in this category?"
                    value=[values.description.as_deref()]
                    maxlength=(MAX_DESCRIPTION_LENGTH)
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                label for="icon" class=(FORM_LABEL_STYLE) { "Icon" }

                input
                    id="icon"
                    type="text"
                    name="icon"
                    placeholder="e.g. utensils"
                    value=[values.icon.as_deref()]
                    maxlength=(MAX_ICON_LENGTH)
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                label for="color" class=(FORM_LABEL_STYLE) { "Colour" }

                input
                    id="color"
                    type="text"
                    name="color"
                    placeholder="#RRGGBB"
                    pattern="#[0-9A-Fa-f]{6}"
                    value=[values.color.as_deref()]
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            @if let Some(error_message) = error_message {
                p class="text-red-600 dark:text-red-400" { (error_message) }
            }

            button type="submit" id="indicator" class=(BUTTON_PRIMARY_STYLE)
            {
                span class="htmx-indicator" { (loading_spinner()) }
                (submit_label)
            }
        }
    }
}
