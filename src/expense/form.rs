//! The expense form shared by the add and edit pages, and its validation.

use maud::{Markup, html};
use serde::{Deserialize, Serialize};
use time::{Date, macros::format_description};

use crate::{
    endpoints,
    expense::{Amount, AmountError, Category, Expense, ExpenseFields},
    html::{
        BUTTON_PRIMARY_STYLE, FORM_CONTAINER_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE,
        LINK_STYLE, base, field_error,
    },
    navigation::NavBar,
};

/// The longest title an expense can have, in characters.
pub const MAX_TITLE_LENGTH: usize = 255;

const REQUIRED_ERROR_MSG: &str = "This field is required.";

/// The raw data entered by the user in the expense form.
///
/// Fields are kept as strings so the form can be shown again exactly as it
/// was submitted. Any other fields in the request body, such as an owner,
/// are ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExpenseForm {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub amount: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub date: String,
}

impl From<&Expense> for ExpenseForm {
    fn from(expense: &Expense) -> Self {
        Self {
            title: expense.title.clone(),
            amount: expense.amount.to_string(),
            category: expense.category.to_string(),
            date: expense.date.to_string(),
        }
    }
}

/// Error messages for each field of an [ExpenseForm].
#[derive(Debug, Default, PartialEq)]
pub struct ExpenseFormErrors {
    pub title: Option<String>,
    pub amount: Option<String>,
    pub category: Option<String>,
    pub date: Option<String>,
}

/// Check every field of `form` and convert it into [ExpenseFields].
///
/// # Errors
///
/// Returns a message for each field that is invalid.
pub fn validate_expense_form(form: &ExpenseForm) -> Result<ExpenseFields, ExpenseFormErrors> {
    let title = validate_title(&form.title);
    let amount = validate_amount(&form.amount);
    let category = validate_category(&form.category);
    let date = validate_date(&form.date);

    match (title, amount, category, date) {
        (Ok(title), Ok(amount), Ok(category), Ok(date)) => Ok(ExpenseFields {
            title,
            amount,
            category,
            date,
        }),
        (title, amount, category, date) => Err(ExpenseFormErrors {
            title: title.err(),
            amount: amount.err(),
            category: category.err(),
            date: date.err(),
        }),
    }
}

fn validate_title(raw_title: &str) -> Result<String, String> {
    let title = raw_title.trim();

    if title.is_empty() {
        return Err(REQUIRED_ERROR_MSG.to_owned());
    }

    if title.chars().count() > MAX_TITLE_LENGTH {
        return Err(format!(
            "Ensure this value has at most {MAX_TITLE_LENGTH} characters."
        ));
    }

    Ok(title.to_owned())
}

fn validate_amount(raw_amount: &str) -> Result<Amount, String> {
    let amount = raw_amount.parse::<Amount>().map_err(|error| match error {
        AmountError::Empty => REQUIRED_ERROR_MSG.to_owned(),
        AmountError::NotANumber(_) => "Enter a number.".to_owned(),
        AmountError::TooManyDecimalPlaces => {
            "Ensure that there are no more than 2 decimal places.".to_owned()
        }
        AmountError::TooManyDigits => {
            "Ensure that there are no more than 8 digits before the decimal point.".to_owned()
        }
    })?;

    if amount.is_negative() {
        return Err("Ensure this value is greater than or equal to 0.".to_owned());
    }

    Ok(amount)
}

fn validate_category(raw_category: &str) -> Result<Category, String> {
    let raw_category = raw_category.trim();

    if raw_category.is_empty() {
        return Err(REQUIRED_ERROR_MSG.to_owned());
    }

    raw_category
        .parse()
        .map_err(|error| format!("Select a valid choice. {error}."))
}

fn validate_date(raw_date: &str) -> Result<Date, String> {
    let raw_date = raw_date.trim();

    if raw_date.is_empty() {
        return Err(REQUIRED_ERROR_MSG.to_owned());
    }

    Date::parse(raw_date, format_description!("[year]-[month]-[day]"))
        .map_err(|_| "Enter a valid date.".to_owned())
}

/// Render the inputs of the expense form, filled in with `values`.
///
/// The caller provides the surrounding `form` element and submit button.
pub fn expense_form_fields(values: &ExpenseForm, errors: &ExpenseFormErrors) -> Markup {
    html! {
        div
        {
            label for="title" class=(FORM_LABEL_STYLE) { "Title" }

            input
                name="title"
                id="title"
                type="text"
                placeholder="Title"
                maxlength=(MAX_TITLE_LENGTH)
                value=(values.title)
                required
                autofocus
                class=(FORM_TEXT_INPUT_STYLE);

            (field_error(errors.title.as_deref()))
        }

        div
        {
            label for="amount" class=(FORM_LABEL_STYLE) { "Amount" }

            input
                name="amount"
                id="amount"
                type="number"
                step="0.01"
                min="0"
                placeholder="0.00"
                value=(values.amount)
                required
                class=(FORM_TEXT_INPUT_STYLE);

            (field_error(errors.amount.as_deref()))
        }

        div
        {
            label for="category" class=(FORM_LABEL_STYLE) { "Category" }

            select
                name="category"
                id="category"
                required
                class=(FORM_TEXT_INPUT_STYLE)
            {
                option value="" { "Select a category" }

                @for category in Category::ALL {
                    @if values.category == category.as_str() {
                        option value=(category) selected { (category) }
                    } @else {
                        option value=(category) { (category) }
                    }
                }
            }

            (field_error(errors.category.as_deref()))
        }

        div
        {
            label for="date" class=(FORM_LABEL_STYLE) { "Date" }

            input
                name="date"
                id="date"
                type="date"
                value=(values.date)
                required
                class=(FORM_TEXT_INPUT_STYLE);

            (field_error(errors.date.as_deref()))
        }
    }
}

/// A full page with the expense form that posts to `action`.
///
/// Used by both the add and edit pages so that they look the same.
pub fn expense_form_page(
    page_title: &str,
    action: &str,
    values: &ExpenseForm,
    errors: &ExpenseFormErrors,
) -> Markup {
    let nav_bar = NavBar::new(action).into_html();
    let fields = expense_form_fields(values, errors);

    let content = html! {
        (nav_bar)

        div class=(FORM_CONTAINER_STYLE)
        {
            h1 class="text-xl font-bold leading-tight tracking-tight md:text-2xl mb-4"
            {
                (page_title)
            }

            form
                method="post"
                action=(action)
                class="w-full space-y-4 md:space-y-6"
            {
                (fields)

                button type="submit" id="submit-button" tabindex="0" class=(BUTTON_PRIMARY_STYLE)
                {
                    "Save"
                }
            }

            a href=(endpoints::DASHBOARD_VIEW) class={ "mt-4 " (LINK_STYLE) } { "Cancel" }
        }
    };

    base(page_title, &[], &content)
}

#[cfg(test)]
mod validate_expense_form_tests {
    use time::macros::date;

    use crate::expense::{Amount, Category, ExpenseFields};

    use super::{ExpenseForm, validate_expense_form};

    fn form(title: &str, amount: &str, category: &str, date: &str) -> ExpenseForm {
        ExpenseForm {
            title: title.to_owned(),
            amount: amount.to_owned(),
            category: category.to_owned(),
            date: date.to_owned(),
        }
    }

    #[test]
    fn accepts_valid_form() {
        let got = validate_expense_form(&form("  Lunch ", "12.5", "Food", "2024-01-05"));

        assert_eq!(
            got,
            Ok(ExpenseFields {
                title: "Lunch".to_owned(),
                amount: Amount::from_cents(1250),
                category: Category::Food,
                date: date!(2024 - 01 - 05),
            })
        );
    }

    #[test]
    fn accepts_zero_amount() {
        let got = validate_expense_form(&form("Freebie", "0", "Shopping", "2024-01-05"));

        assert_eq!(got.map(|fields| fields.amount), Ok(Amount::ZERO));
    }

    #[test]
    fn empty_form_requires_every_field() {
        let errors = validate_expense_form(&ExpenseForm::default()).unwrap_err();

        let required = Some("This field is required.");
        assert_eq!(errors.title.as_deref(), required);
        assert_eq!(errors.amount.as_deref(), required);
        assert_eq!(errors.category.as_deref(), required);
        assert_eq!(errors.date.as_deref(), required);
    }

    #[test]
    fn rejects_bad_amounts() {
        let cases = [
            ("abc", "Enter a number."),
            ("1.234", "Ensure that there are no more than 2 decimal places."),
            (
                "123456789",
                "Ensure that there are no more than 8 digits before the decimal point.",
            ),
            ("-5.00", "Ensure this value is greater than or equal to 0."),
        ];

        for (amount, want) in cases {
            let errors =
                validate_expense_form(&form("Lunch", amount, "Food", "2024-01-05")).unwrap_err();

            assert_eq!(errors.amount.as_deref(), Some(want), "amount {amount:?}");
            assert_eq!(errors.title, None);
            assert_eq!(errors.category, None);
            assert_eq!(errors.date, None);
        }
    }

    #[test]
    fn rejects_unknown_category() {
        let errors =
            validate_expense_form(&form("Lunch", "1", "Groceries", "2024-01-05")).unwrap_err();

        assert_eq!(
            errors.category.as_deref(),
            Some("Select a valid choice. Groceries is not one of the available choices.")
        );
    }

    #[test]
    fn rejects_invalid_date() {
        for date in ["2024-02-30", "05/01/2024", "yesterday"] {
            let errors = validate_expense_form(&form("Lunch", "1", "Food", date)).unwrap_err();

            assert_eq!(errors.date.as_deref(), Some("Enter a valid date."), "date {date:?}");
        }
    }

    #[test]
    fn rejects_long_title() {
        let title = "a".repeat(256);

        let errors = validate_expense_form(&form(&title, "1", "Food", "2024-01-05")).unwrap_err();

        assert_eq!(
            errors.title.as_deref(),
            Some("Ensure this value has at most 255 characters.")
        );
    }
}

#[cfg(test)]
mod expense_form_fields_tests {
    use scraper::{Html, Selector};

    use super::{ExpenseForm, ExpenseFormErrors, expense_form_fields};

    fn render(values: &ExpenseForm, errors: &ExpenseFormErrors) -> Html {
        let fields = expense_form_fields(values, errors);
        let markup = maud::html! { form { (fields) } };
        Html::parse_document(&markup.into_string())
    }

    #[test]
    fn selects_submitted_category() {
        let values = ExpenseForm {
            category: "Bills".to_owned(),
            ..Default::default()
        };

        let document = render(&values, &ExpenseFormErrors::default());

        let selector = Selector::parse("select[name=category] option[selected]").unwrap();
        let selected = document
            .select(&selector)
            .map(|option| option.value().attr("value").unwrap_or_default().to_owned())
            .collect::<Vec<_>>();
        assert_eq!(selected, ["Bills"]);
    }

    #[test]
    fn lists_every_category() {
        let document = render(&ExpenseForm::default(), &ExpenseFormErrors::default());

        let selector = Selector::parse("select[name=category] option").unwrap();
        let options = document
            .select(&selector)
            .filter_map(|option| option.value().attr("value"))
            .filter(|value| !value.is_empty())
            .collect::<Vec<_>>();
        assert_eq!(options, ["Food", "Travel", "Shopping", "Bills", "Entertainment"]);
    }

    #[test]
    fn shows_errors_under_fields() {
        let errors = ExpenseFormErrors {
            amount: Some("Enter a number.".to_owned()),
            ..Default::default()
        };

        let document = render(&ExpenseForm::default(), &errors);

        let selector = Selector::parse("input#amount + p").unwrap();
        let message = document
            .select(&selector)
            .next()
            .expect("No amount error found")
            .text()
            .collect::<String>();
        assert_eq!(message.trim(), "Enter a number.");
    }
}
