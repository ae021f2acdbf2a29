mod common;

use std::cmp::Ordering;

use common::{TestWorkspace, contact_table, fixture_path, load_table};
use record_scrub::{
    CanonicalRecord, CleaningConfig, Cleaner, LatestRow, RawTable, RecordType, SchemaError, clean,
    dedup::Candidate,
    io_utils,
    record::{Account, Contact, Field},
    validate::DropReason,
};

fn contact_emails(records: &[CanonicalRecord]) -> Vec<String> {
    records
        .iter()
        .filter_map(|record| match record {
            CanonicalRecord::Contact(contact) => contact.email.clone(),
            CanonicalRecord::Account(_) => None,
        })
        .collect()
}

fn round_trip(workspace: &TestWorkspace, outcome: &record_scrub::CleanOutcome) -> RawTable {
    let path = workspace.path().join("cleaned.csv");
    let mut writer = io_utils::open_csv_writer(Some(&path), b',').expect("open writer");
    io_utils::write_outcome(&mut writer, outcome, None).expect("write outcome");
    drop(writer);
    load_table(&path)
}

#[test]
fn forty_one_contacts_reduce_to_thirty_three() {
    let mut rows: Vec<(String, String)> = (0..33)
        .map(|i| (format!("Person {i}"), format!("person{i}@company{i}.io")))
        .collect();
    for i in 0..5 {
        rows.insert(
            10 + i * 5,
            (format!("P. {i}"), format!("PERSON{i}@Company{i}.io")),
        );
    }
    rows.insert(3, ("Front Desk".into(), "info@company3.io".into()));
    rows.insert(17, ("Tester".into(), "test@example.com".into()));
    rows.push(("Throwaway".into(), "qa@test.com".into()));
    assert_eq!(rows.len(), 41);

    let borrowed = rows
        .iter()
        .map(|(name, email)| (name.as_str(), email.as_str()))
        .collect::<Vec<_>>();
    let config = CleaningConfig::default();
    let outcome = clean(&contact_table(&borrowed), RecordType::Contact, &config).expect("clean");

    assert_eq!(outcome.stats.original_count, 41);
    assert_eq!(outcome.stats.invalid_filtered, 3);
    assert_eq!(outcome.stats.duplicates_removed, 5);
    assert_eq!(outcome.stats.final_count, 33);
    assert_eq!(outcome.stats.data_retained_pct, 80.5);
    assert!(outcome.stats.is_consistent());
    assert_eq!(outcome.records.len(), 33);
}

#[test]
fn messy_contact_fixture_is_cleaned() {
    let config = CleaningConfig::default();
    let table = load_table(&fixture_path("contacts_messy.csv"));
    let outcome = clean(&table, RecordType::Contact, &config).expect("clean");

    assert_eq!(outcome.stats.original_count, 8);
    assert_eq!(outcome.stats.invalid_filtered, 3);
    assert_eq!(outcome.stats.duplicates_removed, 2);
    assert_eq!(outcome.stats.final_count, 3);
    assert_eq!(outcome.stats.data_retained_pct, 37.5);

    assert_eq!(outcome.diagnostics.dropped(DropReason::GenericEmail), 1);
    assert_eq!(outcome.diagnostics.dropped(DropReason::MalformedEmail), 1);
    assert_eq!(outcome.diagnostics.dropped(DropReason::MissingEmail), 1);
    assert_eq!(outcome.diagnostics.field_issues.get(&Field::Email), Some(&1));

    assert_eq!(
        outcome.records[0],
        CanonicalRecord::Contact(Contact {
            full_name: Some("Jane Doe".into()),
            email: Some("jane@acme.com".into()),
            title: Some("VP Sales".into()),
            phone: Some("+15551234567".into()),
            linkedin_url: Some("https://linkedin.com/in/janedoe".into()),
            country: Some("United States".into()),
            domain: Some("acme.com".into()),
        })
    );
    assert_eq!(
        outcome.records[2],
        CanonicalRecord::Contact(Contact {
            full_name: Some("carol white".into()),
            email: Some("carol@initech.com".into()),
            title: Some("CTO".into()),
            phone: Some("0044201234".into()),
            linkedin_url: Some("https://linkedin.com/in/carol".into()),
            country: Some("United Kingdom".into()),
            domain: Some("initech.com".into()),
        })
    );
    assert_eq!(
        contact_emails(&outcome.records),
        vec!["jane@acme.com", "bob@globex.io", "carol@initech.com"]
    );
}

#[test]
fn messy_account_fixture_is_cleaned() {
    let config = CleaningConfig::default();
    let table = load_table(&fixture_path("accounts_messy.csv"));
    let outcome = clean(&table, RecordType::Account, &config).expect("clean");

    assert_eq!(outcome.stats.original_count, 5);
    assert_eq!(outcome.stats.invalid_filtered, 1);
    assert_eq!(outcome.stats.duplicates_removed, 2);
    assert_eq!(outcome.stats.final_count, 2);
    assert_eq!(outcome.diagnostics.dropped(DropReason::MissingName), 1);
    assert_eq!(outcome.diagnostics.field_issues.get(&Field::EmployeeCount), Some(&1));

    assert_eq!(
        outcome.records,
        vec![
            CanonicalRecord::Account(Account {
                name: Some("Acme Corp".into()),
                website: Some("https://www.acme-corp.com/about".into()),
                domain: Some("acme-corp.com".into()),
                industry: Some("Software".into()),
                employee_count: Some(1200),
                billing_country: Some("United States".into()),
            }),
            CanonicalRecord::Account(Account {
                name: Some("Globex".into()),
                website: None,
                domain: None,
                industry: Some("Manufacturing".into()),
                employee_count: None,
                billing_country: Some("Germany".into()),
            }),
        ]
    );
}

#[test]
fn account_domain_is_derived_from_website() {
    let table = RawTable::new(["name", "website"]).with_row(["Acme", "acme-corp.com"]);
    let outcome = clean(&table, RecordType::Account, &CleaningConfig::default()).expect("clean");
    assert_eq!(
        outcome.records[0].get(Field::Domain).map(|v| v.to_string()).as_deref(),
        Some("acme-corp.com")
    );
}

#[test]
fn explicit_domain_column_wins_over_website() {
    let table = RawTable::new(["name", "website", "domain"]).with_row([
        "Acme",
        "https://shop.acme-corp.com",
        "acme-corp.com",
    ]);
    let outcome = clean(&table, RecordType::Account, &CleaningConfig::default()).expect("clean");
    assert_eq!(
        outcome.records[0].get(Field::Domain).map(|v| v.to_string()).as_deref(),
        Some("acme-corp.com")
    );
}

#[test]
fn missing_email_column_is_a_schema_error() {
    let table = RawTable::new(["full_name", "phone"]).with_row(["Jane", "555"]);
    let err = clean(&table, RecordType::Contact, &CleaningConfig::default())
        .expect_err("email column is required");
    assert_eq!(
        err,
        SchemaError::MissingField {
            field: Field::Email,
            record_type: RecordType::Contact,
        }
    );
}

#[test]
fn missing_name_column_is_a_schema_error_even_without_rows() {
    let table = RawTable::new(["website"]);
    let err = clean(&table, RecordType::Account, &CleaningConfig::default())
        .expect_err("name column is required");
    assert_eq!(err.missing_field(), Field::Name);
}

#[test]
fn empty_input_produces_empty_stats() {
    let table = RawTable::new(["email"]);
    let outcome = clean(&table, RecordType::Contact, &CleaningConfig::default()).expect("clean");
    assert!(outcome.records.is_empty());
    assert_eq!(outcome.stats.original_count, 0);
    assert_eq!(outcome.stats.data_retained_pct, 0.0);
}

#[test]
fn cleaning_cleaned_output_is_a_no_op() {
    let config = CleaningConfig::default();
    let workspace = TestWorkspace::new();
    for (fixture, record_type) in [
        ("contacts_messy.csv", RecordType::Contact),
        ("accounts_messy.csv", RecordType::Account),
    ] {
        let first = clean(&load_table(&fixture_path(fixture)), record_type, &config).expect("clean");
        let second =
            clean(&round_trip(&workspace, &first), record_type, &config).expect("re-clean");
        assert_eq!(second.records, first.records, "{fixture}");
        assert_eq!(second.stats.invalid_filtered, 0, "{fixture}");
        assert_eq!(second.stats.duplicates_removed, 0, "{fixture}");
        assert_eq!(second.diagnostics.total_field_issues(), 0, "{fixture}");
    }
}

#[test]
fn more_complete_duplicate_survives_in_either_order() {
    let complete = ["Jane Doe", "jane@acme.com", "VP Sales", "555-0100"];
    let sparse = ["", "JANE@acme.com", "", ""];
    let headers = ["full_name", "email", "title", "phone"];
    let config = CleaningConfig::default();

    for rows in [[complete, sparse], [sparse, complete]] {
        let table = rows
            .iter()
            .fold(RawTable::new(headers), |table, row| table.with_row(*row));
        let outcome = clean(&table, RecordType::Contact, &config).expect("clean");
        assert_eq!(outcome.records.len(), 1);
        assert!(outcome.records[0].is_present(Field::Phone));
        assert!(outcome.records[0].is_present(Field::Title));
        assert_eq!(outcome.stats.duplicates_removed, 1);
    }
}

#[test]
fn equally_complete_duplicates_keep_the_first_row() {
    let table = contact_table(&[("First", "jo@acme.com"), ("Second", "JO@acme.com")]);
    let outcome = clean(&table, RecordType::Contact, &CleaningConfig::default()).expect("clean");
    assert_eq!(outcome.records.len(), 1);
    assert_eq!(
        outcome.records[0].get(Field::FullName).map(|v| v.to_string()).as_deref(),
        Some("First")
    );
}

#[test]
fn latest_policy_keeps_the_last_row() {
    let table = contact_table(&[("First", "jo@acme.com"), ("Second", "jo@acme.com")]);
    let config = CleaningConfig::default();
    let cleaner = Cleaner::new(&config).with_policy(LatestRow);
    assert_eq!(cleaner.policy_name(), "latest");
    let outcome = cleaner.clean(&table, RecordType::Contact).expect("clean");
    assert_eq!(
        outcome.records[0].get(Field::FullName).map(|v| v.to_string()).as_deref(),
        Some("Second")
    );
}

#[test]
fn closure_policy_can_replace_the_default() {
    let table = RawTable::new(["email", "phone", "title"])
        .with_row(["jo@acme.com", "", "Founder"])
        .with_row(["jo@acme.com", "555-0100", ""]);
    let config = CleaningConfig::default();
    let prefer_phone = |challenger: &Candidate, incumbent: &Candidate| -> Ordering {
        challenger
            .record
            .is_present(Field::Phone)
            .cmp(&incumbent.record.is_present(Field::Phone))
    };
    let outcome = Cleaner::new(&config)
        .with_policy(prefer_phone)
        .clean(&table, RecordType::Contact)
        .expect("clean");
    assert_eq!(outcome.records.len(), 1);
    assert!(outcome.records[0].is_present(Field::Phone));
    assert!(!outcome.records[0].is_present(Field::Title));
}

#[test]
fn survivors_keep_input_order() {
    let table = RawTable::new(["email", "phone"])
        .with_row(["a@acme.com", ""])
        .with_row(["b@acme.com", ""])
        .with_row(["a@acme.com", "555"])
        .with_row(["c@acme.com", ""]);
    let outcome = clean(&table, RecordType::Contact, &CleaningConfig::default()).expect("clean");
    assert_eq!(
        contact_emails(&outcome.records),
        vec!["b@acme.com", "a@acme.com", "c@acme.com"]
    );
}

#[test]
fn accounts_without_domain_group_by_name() {
    let table = RawTable::new(["name", "industry"])
        .with_row(["Initech", ""])
        .with_row(["  INITECH ", "software"])
        .with_row(["initech.com", ""]);
    let outcome = clean(&table, RecordType::Account, &CleaningConfig::default()).expect("clean");
    assert_eq!(outcome.records.len(), 2);
    assert_eq!(
        outcome.records[0].get(Field::Industry).map(|v| v.to_string()).as_deref(),
        Some("Software")
    );
}

#[test]
fn configured_lists_change_classification() {
    let config = CleaningConfig::from_yaml_str(
        "email:\n  generic_local_parts: [sales]\n  blocked_domains: [acme.com]\n",
    )
    .expect("config");
    let table = contact_table(&[
        ("A", "info@globex.io"),
        ("B", "sales@globex.io"),
        ("C", "jo@acme.com"),
    ]);
    let outcome = clean(&table, RecordType::Contact, &config).expect("clean");
    assert_eq!(contact_emails(&outcome.records), vec!["info@globex.io"]);
    assert_eq!(outcome.diagnostics.dropped(DropReason::GenericEmail), 1);
    assert_eq!(outcome.diagnostics.dropped(DropReason::BlockedEmailDomain), 1);
}

#[test]
fn addresses_with_broken_hosts_are_dropped_as_malformed() {
    let table = contact_table(&[
        ("A", "jo@acme..com"),
        ("B", "jo@-acme.com"),
        ("C", "jo@acme.com"),
    ]);
    let outcome = clean(&table, RecordType::Contact, &CleaningConfig::default()).expect("clean");
    assert_eq!(contact_emails(&outcome.records), vec!["jo@acme.com"]);
    assert_eq!(outcome.diagnostics.dropped(DropReason::MalformedEmail), 2);
    assert_eq!(outcome.diagnostics.field_issues.get(&Field::Email), Some(&2));
}

#[test]
fn loosely_formatted_headcounts_are_flagged() {
    let table = RawTable::new(["name", "employees"])
        .with_row(["Acme", "1e3"])
        .with_row(["Globex", "1,2,3"])
        .with_row(["Initech", "2,500"]);
    let outcome = clean(&table, RecordType::Account, &CleaningConfig::default()).expect("clean");
    let counts: Vec<Option<i64>> = outcome
        .records
        .iter()
        .map(|record| match record {
            CanonicalRecord::Account(account) => account.employee_count,
            CanonicalRecord::Contact(_) => None,
        })
        .collect();
    assert_eq!(counts, vec![None, None, Some(2500)]);
    assert_eq!(outcome.diagnostics.field_issues.get(&Field::EmployeeCount), Some(&2));
}

#[test]
fn configured_aliases_map_custom_headers() {
    let config = CleaningConfig::from_yaml_str(
        "aliases:\n  contact:\n    email: [courriel]\n    full_name: [nom complet]\n",
    )
    .expect("config");
    let table = RawTable::new(["Nom Complet", "Courriel"]).with_row(["Jo Bloggs", "jo@acme.com"]);
    let outcome = clean(&table, RecordType::Contact, &config).expect("clean");
    assert_eq!(outcome.records.len(), 1);
    assert_eq!(
        outcome.records[0].get(Field::FullName).map(|v| v.to_string()).as_deref(),
        Some("Jo Bloggs")
    );
}
