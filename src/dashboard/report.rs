//! Per-category totals for a set of expenses.

use crate::expense::{Amount, Category, Expense};

/// The total spent in one category.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryTotal {
    pub category: Category,
    pub total: Amount,
    /// The share of the grand total, from 0 to 100.
    pub percentage: f64,
}

/// The breakdown of a set of expenses by category.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpenseReport {
    /// Sorted by total, largest first.
    pub category_totals: Vec<CategoryTotal>,
    pub grand_total: Amount,
}

impl ExpenseReport {
    /// Sum `expenses` per category.
    ///
    /// Categories with equal totals keep the order in which they first
    /// appear in `expenses`.
    pub fn new(expenses: &[Expense]) -> Self {
        let mut sums: Vec<(Category, Amount)> = Vec::new();

        for expense in expenses {
            match sums
                .iter_mut()
                .find(|(category, _)| *category == expense.category)
            {
                Some((_, total)) => *total += expense.amount,
                None => sums.push((expense.category, expense.amount)),
            }
        }

        // sort_by is stable, so ties stay in first-seen order.
        sums.sort_by(|(_, a), (_, b)| b.cmp(a));

        let grand_total: Amount = sums.iter().map(|(_, total)| *total).sum();

        let category_totals = sums
            .into_iter()
            .map(|(category, total)| CategoryTotal {
                category,
                total,
                percentage: percentage_of(total, grand_total),
            })
            .collect();

        Self {
            category_totals,
            grand_total,
        }
    }

    /// Whether there is anything to chart.
    pub fn is_empty(&self) -> bool {
        self.category_totals.is_empty()
    }
}

fn percentage_of(total: Amount, grand_total: Amount) -> f64 {
    if grand_total.is_zero() {
        0.0
    } else {
        total.cents() as f64 / grand_total.cents() as f64 * 100.0
    }
}

#[cfg(test)]
mod expense_report_tests {
    use time::macros::date;

    use crate::{
        auth::UserID,
        expense::{Amount, Category, Expense},
    };

    use super::{CategoryTotal, ExpenseReport};

    fn expense(id: i64, category: Category, cents: i64) -> Expense {
        Expense {
            id,
            owner: UserID::new(1),
            title: format!("Expense {id}"),
            amount: Amount::from_cents(cents),
            category,
            date: date!(2024 - 01 - 01),
        }
    }

    #[test]
    fn empty_report_has_zero_total() {
        let report = ExpenseReport::new(&[]);

        assert!(report.is_empty());
        assert_eq!(report.grand_total, Amount::ZERO);
    }

    #[test]
    fn sums_per_category_largest_first() {
        let expenses = [
            expense(1, Category::Food, 1000),
            expense(2, Category::Travel, 5000),
            expense(3, Category::Food, 2500),
            expense(4, Category::Bills, 1500),
        ];

        let report = ExpenseReport::new(&expenses);

        assert_eq!(
            report
                .category_totals
                .iter()
                .map(|total| (total.category, total.total))
                .collect::<Vec<_>>(),
            vec![
                (Category::Travel, Amount::from_cents(5000)),
                (Category::Food, Amount::from_cents(3500)),
                (Category::Bills, Amount::from_cents(1500)),
            ]
        );
        assert_eq!(report.grand_total, Amount::from_cents(10000));
    }

    #[test]
    fn grand_total_matches_sum_of_expenses() {
        let expenses = [
            expense(1, Category::Food, 333),
            expense(2, Category::Shopping, 667),
            expense(3, Category::Entertainment, 1),
        ];

        let report = ExpenseReport::new(&expenses);

        let want: Amount = expenses.iter().map(|expense| expense.amount).sum();
        assert_eq!(report.grand_total, want);
        let from_categories: Amount = report.category_totals.iter().map(|total| total.total).sum();
        assert_eq!(from_categories, want);
    }

    #[test]
    fn ties_keep_first_seen_order() {
        let expenses = [
            expense(1, Category::Shopping, 500),
            expense(2, Category::Bills, 500),
            expense(3, Category::Food, 500),
        ];

        let report = ExpenseReport::new(&expenses);

        let categories = report
            .category_totals
            .iter()
            .map(|total| total.category)
            .collect::<Vec<_>>();
        assert_eq!(
            categories,
            vec![Category::Shopping, Category::Bills, Category::Food]
        );
    }

    #[test]
    fn calculates_percentages() {
        let expenses = [
            expense(1, Category::Food, 7500),
            expense(2, Category::Travel, 2500),
        ];

        let report = ExpenseReport::new(&expenses);

        assert_eq!(
            report.category_totals,
            vec![
                CategoryTotal {
                    category: Category::Food,
                    total: Amount::from_cents(7500),
                    percentage: 75.0,
                },
                CategoryTotal {
                    category: Category::Travel,
                    total: Amount::from_cents(2500),
                    percentage: 25.0,
                },
            ]
        );
    }

    #[test]
    fn zero_grand_total_gives_zero_percentages() {
        let expenses = [
            expense(1, Category::Food, 0),
            expense(2, Category::Travel, 0),
        ];

        let report = ExpenseReport::new(&expenses);

        assert_eq!(report.grand_total, Amount::ZERO);
        assert!(
            report
                .category_totals
                .iter()
                .all(|total| total.percentage == 0.0)
        );
    }
}
