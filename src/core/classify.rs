use std::collections::BTreeSet;

use crate::core::index::ReferenceIndex;
use crate::core::normalize::normalize_phone;
use crate::domain::model::{Category, ClassifiedRecord, UploadData};

/// Classifies every upload row against a reference snapshot.
///
/// A row matches iff its normalized contact exists in the index AND the
/// intersection of its reference categories with the caller-requested set is
/// non-empty. A contact flagged only under categories the caller did not
/// request is non-matching. Rows with an empty normalized contact are kept
/// as non-matching rather than dropped.
///
/// Pure over (upload, index snapshot, requested): identical inputs always
/// produce identical classifications.
pub fn classify_rows(
    upload: &UploadData,
    column_index: usize,
    index: &ReferenceIndex,
    requested: &BTreeSet<Category>,
) -> Vec<ClassifiedRecord> {
    upload
        .rows
        .iter()
        .map(|row| {
            let raw = row.get(column_index).map(String::as_str);
            let contact = normalize_phone(raw);

            let status: BTreeSet<Category> = match index.lookup(&contact) {
                Some(reference_categories) => reference_categories
                    .intersection(requested)
                    .copied()
                    .collect(),
                None => BTreeSet::new(),
            };

            ClassifiedRecord {
                values: row.clone(),
                status,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::ReferenceRow;

    fn upload(rows: Vec<Vec<&str>>) -> UploadData {
        UploadData {
            headers: vec!["name".to_string(), "phone".to_string()],
            rows: rows
                .into_iter()
                .map(|r| r.into_iter().map(String::from).collect())
                .collect(),
        }
    }

    fn tcpa_index() -> ReferenceIndex {
        ReferenceIndex::build(&[ReferenceRow {
            contact: "5551234567".into(),
            tcpa: true,
            dnc_complainers: false,
            federal_dnc: false,
        }])
    }

    fn requested(cats: &[Category]) -> BTreeSet<Category> {
        cats.iter().copied().collect()
    }

    #[test]
    fn formatted_number_matches_requested_category() {
        let upload = upload(vec![vec!["A", "(555) 123-4567"]]);
        let index = tcpa_index();

        let classified = classify_rows(
            &upload,
            1,
            &index,
            &requested(&[Category::Tcpa, Category::FederalDnc]),
        );

        assert_eq!(classified.len(), 1);
        assert!(classified[0].is_match());
        assert_eq!(
            classified[0].status.iter().copied().collect::<Vec<_>>(),
            vec![Category::Tcpa]
        );
    }

    #[test]
    fn empty_phone_is_retained_as_non_match() {
        let upload = upload(vec![vec!["A", ""]]);
        let index = tcpa_index();

        let classified = classify_rows(&upload, 1, &index, &requested(&Category::ALL));

        assert_eq!(classified.len(), 1);
        assert!(!classified[0].is_match());
        assert!(classified[0].status.is_empty());
    }

    #[test]
    fn unrequested_category_does_not_match() {
        let upload = upload(vec![vec!["A", "5551234567"]]);
        let index = tcpa_index();

        // Contact is on the TCPA list, but the caller only asked for Federal DNC.
        let classified = classify_rows(&upload, 1, &index, &requested(&[Category::FederalDnc]));

        assert!(!classified[0].is_match());
    }

    #[test]
    fn unknown_number_is_non_match() {
        let upload = upload(vec![vec!["A", "9990001111"]]);
        let index = tcpa_index();

        let classified = classify_rows(&upload, 1, &index, &requested(&Category::ALL));

        assert!(!classified[0].is_match());
    }

    #[test]
    fn every_row_is_classified_exactly_once() {
        let upload = upload(vec![
            vec!["A", "5551234567"],
            vec!["B", ""],
            vec!["C", "9990001111"],
        ]);
        let index = tcpa_index();

        let classified = classify_rows(&upload, 1, &index, &requested(&Category::ALL));

        assert_eq!(classified.len(), 3);
        let matched = classified.iter().filter(|c| c.is_match()).count();
        let unmatched = classified.iter().filter(|c| !c.is_match()).count();
        assert_eq!(matched + unmatched, 3);
        assert_eq!(matched, 1);
    }
}
