use j60adm::domain::model::Show;
use j60adm::{
    AdmError, AssociationConfig, Import, MemoryStore, RecordStore, RegistrationImport,
};

const MAIN_HEADER: &str = "ID;Fornavn;Efternavn;Adresse;Postnr/by;Email;Ansættelsessted;Stilling;Tilmeldingsdato;Antal;Stykpris;;Rabat;Betalt;Markedsføring;Note";

const EXTENDED_HEADER: &str = "ID;Fornavn;Efternavn;Adresse;Postnr/by;Email;Ansættelsessted;Stilling;Tilmeldingsdato;Antal;Stykpris;;Rabat;Betalt;Markedsføring;\"Er du vegetar\";\"Er du gangbesværet, og har du brug for transport?\";\"5. Ønsker du at modtage vores J60-nyhedsbrev?\";Note";

fn main_row(id: &str, first: &str, last: &str, email: &str, paid: &str) -> String {
    format!("{id};{first};{last};Gaden 1;8000 Aarhus C;{email};;;1-9-2015 12:34;1;450,00;;0,00;{paid};Ja tak;")
}

fn extended_row(id: &str, first: &str, last: &str, email: &str, dietary: &str) -> String {
    format!("{id};{first};{last};Gaden 1;8000 Aarhus C;{email};;;1-9-2015 12:34;1;450,00;;0,00;450,00;Ja tak;{dietary};Nej;Ja tak;")
}

fn fixture(anders_paid: &str, bente_email: &str) -> String {
    let mut text = String::new();
    text.push_str("Arrangement:;\"TÅGEKAMMERETS 60 års jubilæumsfest\";\n");
    text.push_str(MAIN_HEADER);
    text.push('\n');
    text.push_str(&main_row("1017", "Anders", "And", "anders@example.com", anders_paid));
    text.push('\n');
    text.push_str(&main_row("1018", "Bente", "Bøll", bente_email, "450,00"));
    text.push('\n');
    text.push('\n');
    text.push_str("Arrangement:;\"Jeg kan desværre ikke komme til revyen\";\n");
    text.push_str(MAIN_HEADER);
    text.push('\n');
    text.push_str(&main_row("1018", "Bente", "Bøll", bente_email, "450,00"));
    text.push('\n');
    text.push('\n');
    text.push_str("Arrangement:;\"Revyforestillingen kl. 13.30\";\n");
    text.push_str(EXTENDED_HEADER);
    text.push('\n');
    text.push_str(&extended_row("1017", "Anders", "And", "anders@example.com", "Vegetar"));
    text.push('\n');
    text.push('\n');
    text.push_str("Arrangement:;\"Revyforestillingen kl. 16.00\";\n");
    text
}

#[tokio::test]
async fn test_import_creates_registrations() {
    let store = MemoryStore::new();
    let import = RegistrationImport::new(&store, AssociationConfig::default());

    let summary = import.run(&fixture("450,00", "bente@example.com")).await.unwrap();
    assert_eq!(summary.created, 2);
    assert_eq!(summary.updated, 0);

    let mut registrations = store.registrations().await.unwrap();
    registrations.sort_by(|a, b| a.survey_id.cmp(&b.survey_id));
    assert_eq!(registrations.len(), 2);

    let anders = &registrations[0];
    assert_eq!(anders.survey_id, "1017");
    assert_eq!(anders.show, Show::First);
    assert_eq!(anders.webshop_show, Show::First);
    assert_eq!(anders.dietary, "Vegetar");
    assert!(!anders.transportation);
    assert!(anders.newsletter);

    let bente = &registrations[1];
    assert_eq!(bente.show, Show::None);
    assert_eq!(bente.webshop_show, Show::None);
    assert_eq!(bente.dietary, "");
}

#[tokio::test]
async fn test_reimport_is_idempotent() {
    let store = MemoryStore::new();
    let import = RegistrationImport::new(&store, AssociationConfig::default());
    let input = fixture("450,00", "bente@example.com");

    import.run(&input).await.unwrap();
    let second = import.run(&input).await.unwrap();
    assert_eq!(second.created, 0);
    assert_eq!(second.updated, 0);
    assert_eq!(store.registrations().await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_refund_is_applied_as_update() {
    let store = MemoryStore::new();
    let import = RegistrationImport::new(&store, AssociationConfig::default());

    import.run(&fixture("450,00", "bente@example.com")).await.unwrap();
    let summary = import.run(&fixture("Refunderet", "bente@example.com")).await.unwrap();
    assert_eq!(summary.created, 0);
    assert_eq!(summary.updated, 1);

    let registrations = store.registrations().await.unwrap();
    let anders = registrations.iter().find(|r| r.survey_id == "1017").unwrap();
    assert_eq!(anders.show, Show::Refund);
    // The webshop slot is unchanged by a refund.
    assert_eq!(anders.webshop_show, Show::First);
}

#[tokio::test]
async fn test_conflicting_email_rejects_whole_batch() {
    let store = MemoryStore::new();
    let import = RegistrationImport::new(&store, AssociationConfig::default());

    import.run(&fixture("450,00", "bente@example.com")).await.unwrap();
    let before = store.registrations().await.unwrap();

    let err = import
        .run(&fixture("450,00", "bente@andet-domaene.dk"))
        .await
        .unwrap_err();
    match err {
        AdmError::Reconciliation { conflicts } => {
            assert_eq!(conflicts.len(), 1);
            assert!(conflicts[0].contains("1018"));
            assert!(conflicts[0].contains("email"));
        }
        other => panic!("expected reconciliation error, got {other}"),
    }

    // Nothing from the rejected batch was committed.
    assert_eq!(store.registrations().await.unwrap(), before);
}

#[tokio::test]
async fn test_wrong_event_name_is_format_error() {
    let store = MemoryStore::new();
    let mut config = AssociationConfig::default();
    config.event_name = "Et helt andet arrangement".to_string();
    let import = RegistrationImport::new(&store, config);

    let err = import.run(&fixture("450,00", "bente@example.com")).await.unwrap_err();
    assert!(matches!(err, AdmError::Format { .. }));
    assert!(store.registrations().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_wrong_main_header_is_format_error() {
    let store = MemoryStore::new();
    let import = RegistrationImport::new(&store, AssociationConfig::default());

    let input = fixture("450,00", "bente@example.com").replace(MAIN_HEADER, "ID;Navn");
    let err = import.run(&input).await.unwrap_err();
    assert!(matches!(err, AdmError::Format { .. }));
    assert!(store.registrations().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_unknown_attendance_section_is_format_error() {
    let store = MemoryStore::new();
    let import = RegistrationImport::new(&store, AssociationConfig::default());

    let input = fixture("450,00", "bente@example.com").replace(
        "Revyforestillingen kl. 16.00",
        "Revyforestillingen kl. 23.59",
    );
    let err = import.run(&input).await.unwrap_err();
    assert!(matches!(err, AdmError::Format { .. }));
}

#[tokio::test]
async fn test_attendance_row_for_unknown_id_is_validation_error() {
    let store = MemoryStore::new();
    let import = RegistrationImport::new(&store, AssociationConfig::default());

    let mut input = fixture("450,00", "bente@example.com");
    input.push_str(MAIN_HEADER);
    input.push('\n');
    input.push_str(&main_row("9999", "Ukendt", "Person", "x@example.com", "450,00"));
    input.push('\n');
    let err = import.run(&input).await.unwrap_err();
    assert!(matches!(err, AdmError::Validation { .. }));
}

#[tokio::test]
async fn test_show_move_between_performances_is_rejected() {
    let store = MemoryStore::new();
    let import = RegistrationImport::new(&store, AssociationConfig::default());

    import.run(&fixture("450,00", "bente@example.com")).await.unwrap();

    // Same batch, but Bente now appears under the 13.30 performance instead
    // of the cannot-attend section.
    let moved = fixture("450,00", "bente@example.com").replace(
        &format!(
            "Arrangement:;\"Jeg kan desværre ikke komme til revyen\";\n{MAIN_HEADER}\n{}\n",
            main_row("1018", "Bente", "Bøll", "bente@example.com", "450,00")
        ),
        "Arrangement:;\"Jeg kan desværre ikke komme til revyen\";\n",
    );
    let with_move = moved.replace(
        &extended_row("1017", "Anders", "And", "anders@example.com", "Vegetar"),
        &format!(
            "{}\n{}",
            extended_row("1017", "Anders", "And", "anders@example.com", "Vegetar"),
            extended_row("1018", "Bente", "Bøll", "bente@example.com", "")
        ),
    );

    let err = import.run(&with_move).await.unwrap_err();
    assert!(matches!(err, AdmError::Reconciliation { .. }));
}
