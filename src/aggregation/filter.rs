//! Searching, filtering and sorting the transaction listing.

use std::str::FromStr;

use crate::{Error, Kind, Transaction, ValidationError};

/// Which kinds of transaction to keep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum KindFilter {
    /// Keep income and expenses.
    #[default]
    All,
    /// Keep income only.
    Income,
    /// Keep expenses only.
    Expense,
}

impl KindFilter {
    fn matches(&self, kind: Kind) -> bool {
        match self {
            KindFilter::All => true,
            KindFilter::Income => kind == Kind::Income,
            KindFilter::Expense => kind == Kind::Expense,
        }
    }
}

impl FromStr for KindFilter {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") {
            return Ok(KindFilter::All);
        }

        match s.parse()? {
            Kind::Income => Ok(KindFilter::Income),
            Kind::Expense => Ok(KindFilter::Expense),
        }
    }
}

/// The order of the transaction listing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortKey {
    /// Most recently added first.
    #[default]
    Latest,
    /// Least recently added first.
    Oldest,
    /// Largest amount first.
    HighestAmount,
    /// Smallest amount first.
    LowestAmount,
}

impl FromStr for SortKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "latest" => Ok(SortKey::Latest),
            "oldest" => Ok(SortKey::Oldest),
            "highest" | "highest-amount" => Ok(SortKey::HighestAmount),
            "lowest" | "lowest-amount" => Ok(SortKey::LowestAmount),
            _ => Err(ValidationError::InvalidSortKey(s.to_owned()).into()),
        }
    }
}

/// The text a search is matched against: every visible field joined with
/// spaces, lowercased.
fn search_text(transaction: &Transaction) -> String {
    format!(
        "{} {} {:?} {} {} {}",
        transaction.id,
        transaction.title,
        transaction.amount,
        transaction.kind,
        transaction.category,
        transaction.timestamp
    )
    .to_lowercase()
}

/// Select and order transactions for the listing.
///
/// A transaction is kept if `search` (trimmed, ignoring case) is a substring
/// of its fields and its kind passes `kind_filter`. An empty `search` keeps
/// everything. The sort is stable, so transactions with equal amounts keep
/// their input order.
pub fn filter_sort<'a>(
    transactions: &'a [Transaction],
    search: &str,
    kind_filter: KindFilter,
    sort_key: SortKey,
) -> Vec<&'a Transaction> {
    let search = search.trim().to_lowercase();

    let mut selected: Vec<&Transaction> = transactions
        .iter()
        .filter(|transaction| kind_filter.matches(transaction.kind))
        .filter(|transaction| search.is_empty() || search_text(transaction).contains(&search))
        .collect();

    match sort_key {
        SortKey::Latest => selected.sort_by(|a, b| b.id.cmp(&a.id)),
        SortKey::Oldest => selected.sort_by_key(|transaction| transaction.id),
        SortKey::HighestAmount => selected.sort_by(|a, b| b.amount.total_cmp(&a.amount)),
        SortKey::LowestAmount => selected.sort_by(|a, b| a.amount.total_cmp(&b.amount)),
    }

    selected
}

#[cfg(test)]
mod tests {
    use time::macros::datetime;

    use crate::{
        Category, Error, Kind, Transaction, ValidationError,
        aggregation::{KindFilter, SortKey, filter_sort, test_utils::create_test_transaction},
    };

    fn sample() -> Vec<Transaction> {
        let when = datetime!(2025-08-14 19:30);
        let mut transactions = vec![
            create_test_transaction(1, 20.0, Kind::Expense, Category::Food, when),
            create_test_transaction(2, 500.0, Kind::Income, Category::Salary, when),
            create_test_transaction(3, 20.0, Kind::Expense, Category::Travel, when),
            create_test_transaction(4, 75.5, Kind::Expense, Category::Entertainment, when),
        ];
        transactions[3].title = "Cinema Tickets".to_owned();
        transactions
    }

    fn ids(selected: &[&Transaction]) -> Vec<i64> {
        selected.iter().map(|transaction| transaction.id).collect()
    }

    #[test]
    fn empty_search_with_all_is_a_permutation() {
        let transactions = sample();

        let mut result = ids(&filter_sort(&transactions, "", KindFilter::All, SortKey::Latest));
        result.sort();

        assert_eq!(result, vec![1, 2, 3, 4]);
    }

    #[test]
    fn latest_and_oldest_sort_by_id() {
        let transactions = sample();

        assert_eq!(
            ids(&filter_sort(&transactions, "", KindFilter::All, SortKey::Latest)),
            vec![4, 3, 2, 1]
        );
        assert_eq!(
            ids(&filter_sort(&transactions, "", KindFilter::All, SortKey::Oldest)),
            vec![1, 2, 3, 4]
        );
    }

    #[test]
    fn highest_amount_is_non_increasing_with_stable_ties() {
        let transactions = sample();

        let result = filter_sort(&transactions, "", KindFilter::All, SortKey::HighestAmount);

        assert_eq!(ids(&result), vec![2, 4, 1, 3]);
        assert!(result.windows(2).all(|pair| pair[0].amount >= pair[1].amount));
    }

    #[test]
    fn lowest_amount_keeps_ties_in_input_order() {
        let transactions = sample();

        let result = filter_sort(&transactions, "", KindFilter::All, SortKey::LowestAmount);

        assert_eq!(ids(&result), vec![1, 3, 4, 2]);
    }

    #[test]
    fn search_ignores_case_and_padding() {
        let transactions = sample();

        let result = filter_sort(&transactions, "  CINEMA ", KindFilter::All, SortKey::Oldest);

        assert_eq!(ids(&result), vec![4]);
    }

    #[test]
    fn search_matches_category_and_timestamp() {
        let transactions = sample();

        assert_eq!(
            ids(&filter_sort(&transactions, "travel", KindFilter::All, SortKey::Oldest)),
            vec![3]
        );
        assert_eq!(
            filter_sort(&transactions, "14-08-2025", KindFilter::All, SortKey::Oldest).len(),
            4
        );
    }

    #[test]
    fn search_matches_amount_with_decimal_point() {
        let transactions = sample();

        let result = filter_sort(&transactions, "500.0", KindFilter::All, SortKey::Oldest);

        assert_eq!(ids(&result), vec![2]);
    }

    #[test]
    fn kind_filter_keeps_only_matching_kind() {
        let transactions = sample();

        assert_eq!(
            ids(&filter_sort(&transactions, "", KindFilter::Income, SortKey::Oldest)),
            vec![2]
        );
        assert_eq!(
            ids(&filter_sort(&transactions, "", KindFilter::Expense, SortKey::Oldest)),
            vec![1, 3, 4]
        );
    }

    #[test]
    fn parses_filter_and_sort_names() {
        assert_eq!("all".parse::<KindFilter>(), Ok(KindFilter::All));
        assert_eq!("Expense".parse::<KindFilter>(), Ok(KindFilter::Expense));
        assert_eq!("highest".parse::<SortKey>(), Ok(SortKey::HighestAmount));
        assert_eq!(
            "newest".parse::<SortKey>(),
            Err(Error::from(ValidationError::InvalidSortKey("newest".to_owned())))
        );
    }
}
