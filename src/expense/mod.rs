//! Expenses: the data model, the database queries, and the pages for
//! adding, editing, deleting and exporting them.

mod amount;
mod category;
mod core;
mod create;
mod delete;
mod edit;
mod export;
mod form;
mod query;

pub use amount::{Amount, AmountError};
pub use category::{Category, UnknownCategory};
pub use core::{
    Expense, ExpenseFields, ExpenseId, create_expense, create_expense_table, delete_expense,
    get_expense, map_expense_row, parse_expense_id, update_expense,
};
pub use create::{add_expense, get_add_expense_page};
pub use delete::{delete_expense_endpoint, get_delete_expense_page};
pub use edit::{edit_expense, get_edit_expense_page};
pub use export::{ExpenseCsvRow, export_csv, write_expenses_csv};
pub use form::{
    ExpenseForm, ExpenseFormErrors, expense_form_fields, expense_form_page, validate_expense_form,
};
pub use query::{ExpenseQuery, SortOrder, aggregate_expenses, count_expenses, list_expenses};
