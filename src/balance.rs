use std::collections::HashMap;

use crate::schemas::{Trip, UserId};

pub type Balance = HashMap<UserId, f64>;

#[derive(Clone, Debug, PartialEq)]
pub struct PaidTotal {
    pub id: UserId,
    pub name: String,
    pub avatar: Option<String>,
    pub total: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ExpenseSummary {
    pub total: f64,
    /// One entry per payer, in order of their first expense.
    pub paid_by: Vec<PaidTotal>,
    pub per_member: f64,
    pub balances: Balance,
}

// Payer is credited the full amount, every person it was split with is
// debited an equal share.
pub fn compute_balance_from_trip(trip: &Trip) -> Balance {
    let mut balance = Balance::new();
    for expense in &trip.expenses {
        let amount = expense.amount;
        *balance.entry(expense.paid_by.id.clone()).or_insert(0.0) += amount;
        if expense.split_with.is_empty() {
            continue;
        }
        let amount_per_receiver = amount / expense.split_with.len() as f64;
        for receiver in &expense.split_with {
            *balance.entry(receiver.id.clone()).or_insert(0.0) -= amount_per_receiver;
        }
    }
    balance
}

pub fn summarize(trip: &Trip) -> ExpenseSummary {
    let total = trip.total_expenses();

    let mut paid_by: Vec<PaidTotal> = Vec::new();
    for expense in &trip.expenses {
        match paid_by.iter_mut().find(|p| p.id == expense.paid_by.id) {
            Some(paid) => paid.total += expense.amount,
            None => paid_by.push(PaidTotal {
                id: expense.paid_by.id.clone(),
                name: expense.paid_by.name.clone(),
                avatar: expense.paid_by.avatar.clone(),
                total: expense.amount,
            }),
        }
    }

    let per_member = if trip.members.is_empty() {
        0.0
    } else {
        total / trip.members.len() as f64
    };

    ExpenseSummary {
        total,
        paid_by,
        per_member,
        balances: compute_balance_from_trip(trip),
    }
}

pub fn format_money(amount: f64) -> String {
    format!("${amount:.2}")
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::schemas::{Expense, Person};

    fn person(id: &str) -> Person {
        Person {
            id: id.into(),
            name: id.to_uppercase(),
            avatar: None,
            location: None,
        }
    }

    fn expense(amount: f64, payer: &str, split: &[&str]) -> Expense {
        Expense {
            id: format!("{payer}-{amount}"),
            name: "thing".into(),
            description: None,
            amount,
            date: NaiveDate::from_ymd_opt(2025, 6, 16).unwrap(),
            paid_by: person(payer),
            split_with: split.iter().map(|id| person(id)).collect(),
        }
    }

    fn trip(members: &[&str], expenses: Vec<Expense>) -> Trip {
        Trip {
            id: "t".into(),
            name: "Trip".into(),
            location: "Somewhere".into(),
            start_date: NaiveDate::from_ymd_opt(2025, 6, 15).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2025, 6, 22).unwrap(),
            cover_image: String::new(),
            created_by: members[0].into(),
            members: members.iter().map(|id| person(id)).collect(),
            expenses,
            photos: vec![],
            hotels: vec![],
        }
    }

    #[test]
    fn single_shared_expense() {
        let trip = trip(&["u1", "u2"], vec![expense(450.0, "u1", &["u1", "u2"])]);
        let summary = summarize(&trip);
        assert_eq!(format_money(summary.total), "$450.00");
        assert_eq!(summary.per_member, 225.0);
        assert_eq!(summary.balances["u1"], 225.0);
        assert_eq!(summary.balances["u2"], -225.0);
    }

    #[test]
    fn paid_totals_follow_first_payment_order() {
        let trip = trip(
            &["a", "b", "c"],
            vec![
                expense(30.0, "b", &["a", "b", "c"]),
                expense(60.0, "a", &["a", "b"]),
                expense(15.0, "b", &["c"]),
            ],
        );
        let summary = summarize(&trip);
        let totals: Vec<_> = summary
            .paid_by
            .iter()
            .map(|p| (p.id.as_str(), p.total))
            .collect();
        assert_eq!(totals, [("b", 45.0), ("a", 60.0)]);
        assert_eq!(summary.total, 105.0);
        assert_eq!(summary.per_member, 35.0);
        let net: f64 = summary.balances.values().sum();
        assert!(net.abs() < 1e-9);
    }

    #[test]
    fn empty_trip_summary() {
        let summary = summarize(&trip(&["a"], vec![]));
        assert_eq!(summary.total, 0.0);
        assert!(summary.paid_by.is_empty());
        assert!(summary.balances.is_empty());
    }
}
