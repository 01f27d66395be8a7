use adoption_form::{Error, FailureSource, FieldRole, FormConfig, FormPage, MockFile, Result};

const ADOPTION_PAGE: &str = r#"
<form id="surveyForm" action="confirmation.html" novalidate>
  <input type="hidden" name="formType" value="adoption">
  <label for="fullName">Pet's Name</label>
  <input type="text" id="fullName" name="petName">
  <span class="error-message" id="fullNameError"></span>
  <label for="email">Owner's Email</label>
  <input type="email" id="email" name="ownerEmail">
  <span class="error-message" id="emailError"></span>
  <input type="password" id="password" name="password">
  <span class="error-message" id="passwordError"></span>
  <input type="number" id="ageYears" name="petAgeYears" placeholder="Years">
  <input type="number" id="ageMonths" name="petAgeMonths" placeholder="Months">
  <span class="error-message" id="ageError"></span>
  <input type="date" id="dob" name="adoptionDate">
  <span class="error-message" id="dobError"></span>
  <input type="range" id="satisfaction" name="energyLevel" min="1" max="10" value="5">
  <span id="rangeValue">5</span>
  <input type="radio" id="dog" name="species" value="Dog"><label for="dog">Dog</label>
  <input type="radio" id="cat" name="species" value="Cat"><label for="cat">Cat</label>
  <span class="error-message" id="genderError"></span>
  <select id="country" name="dietType">
    <option value="">-- Select --</option>
    <option value="Dry Food">Dry Food</option>
    <option value="Wet Food">Wet Food</option>
  </select>
  <span class="error-message" id="countryError"></span>
  <input type="file" id="profilePic" name="petPhoto" accept="image/*">
  <span class="error-message" id="profilePicError"></span>
  <input type="checkbox" id="vetChecked" name="vetChecked" value="yes">
  <textarea id="notes" name="notes" maxlength="20"></textarea>
  <input type="text" id="microchip" name="microchip" pattern="[0-9]{4}">
  <button type="submit" id="submitBtn">Submit Profile</button>
</form>
<div id="confirmationModal" class="modal" style="display: none;">
  <div class="modal-content">
    <span id="closeModalButton" class="close">x</span>
    <h2>Profile Submitted</h2>
    <div id="modalDataOutput"></div>
    <button type="button" id="okButton">OK</button>
  </div>
</div>
"#;

const ERROR_IDS: [&str; 8] = [
    "#fullNameError",
    "#emailError",
    "#passwordError",
    "#ageError",
    "#dobError",
    "#genderError",
    "#countryError",
    "#profilePicError",
];

fn page() -> Result<FormPage> {
    FormPage::from_html(ADOPTION_PAGE, FormConfig::summary_overlay())
}

fn fill_valid(page: &mut FormPage) -> Result<()> {
    page.type_text("#fullName", "Biscuit")?;
    page.type_text("#email", "jo@shelter.org")?;
    page.type_text("#password", "adopt2024")?;
    page.type_text("#ageYears", "2")?;
    page.type_text("#ageMonths", "5")?;
    page.type_text("#dob", "2024-06-30")?;
    page.click("#dog")?;
    page.select_option("#country", "Dry Food")?;
    page.set_files("#profilePic", vec![MockFile::new("biscuit.jpg", 52_311)])?;
    Ok(())
}

fn shown_error_count(page: &FormPage) -> Result<usize> {
    let mut count = 0;
    for id in ERROR_IDS {
        if !page.text(id)?.is_empty() {
            count += 1;
        }
    }
    Ok(count)
}

fn summary_rows(page: &FormPage) -> Vec<(String, String)> {
    page.last_summary()
        .map(|summary| {
            summary
                .rows()
                .iter()
                .map(|row| (row.label.clone(), row.value.clone()))
                .collect()
        })
        .unwrap_or_default()
}

#[test]
fn valid_submission_renders_summary_overlay() -> Result<()> {
    let mut page = page()?;
    fill_valid(&mut page)?;
    page.type_text("#satisfaction", "7")?;
    page.type_text("#notes", "Loves socks")?;
    page.click("#submitBtn")?;

    assert!(page.overlay_visible());
    assert!(page.navigations().is_empty());
    assert_eq!(shown_error_count(&page)?, 0);
    assert_eq!(
        summary_rows(&page),
        vec![
            ("Pet's Age".into(), "2 Years, 5 Months".into()),
            ("Pet's Name".into(), "Biscuit".into()),
            ("Owner's Email".into(), "jo@shelter.org".into()),
            ("Adoption Date".into(), "2024-06-30".into()),
            ("Energy Level (1-10)".into(), "7".into()),
            ("Species".into(), "Dog".into()),
            ("Diet Type".into(), "Dry Food".into()),
            ("Pet Photo File".into(), "biscuit.jpg".into()),
            ("Quirks & Habits".into(), "Loves socks".into()),
            ("Vet Records Up-to-Date".into(), "No".into()),
        ]
    );

    let html = page.dump_dom("#modalDataOutput")?;
    assert!(html.starts_with(
        "<div id=\"modalDataOutput\"><p><strong>Pet's Age:</strong> 2 Years, 5 Months</p>"
    ));
    assert!(!html.contains("adopt2024"));
    assert!(!html.contains("adoption<"));
    Ok(())
}

#[test]
fn console_receives_framed_submission_log() -> Result<()> {
    let mut page = page()?;
    fill_valid(&mut page)?;
    page.click("#submitBtn")?;

    let logs = page.take_console_logs();
    assert_eq!(logs.len(), 3);
    assert_eq!(logs[0], "--- Form Submission Data ---");
    assert_eq!(logs[2], "--------------------------");
    let logged: serde_json::Value = serde_json::from_str(&logs[1]).map_err(|err| {
        Error::AssertionFailed {
            selector: "console".into(),
            expected: "JSON object".into(),
            actual: err.to_string(),
            dom_snippet: logs[1].clone(),
        }
    })?;
    assert_eq!(logged["petAge"], "2 Years, 5 Months");
    assert_eq!(logged["password"], "adopt2024");
    assert_eq!(logged["formType"], "adoption");
    assert_eq!(logged["petAgeMonths"], "5");
    assert_eq!(logged["petPhoto"], "File: biscuit.jpg (52311 bytes)");
    assert_eq!(logged["notes"], "");
    assert_eq!(logged["vetChecked"], "No");
    Ok(())
}

#[test]
fn console_switches_control_the_buffer() -> Result<()> {
    let mut page = page()?;
    fill_valid(&mut page)?;
    page.set_console_enabled(false);
    page.click("#submitBtn")?;
    assert!(page.overlay_visible());
    assert!(page.take_console_logs().is_empty());

    page.click("#okButton")?;
    page.set_console_enabled(true);
    page.set_console_stderr(true);
    fill_valid(&mut page)?;
    page.click("#submitBtn")?;
    assert_eq!(page.take_console_logs().len(), 3);
    Ok(())
}

#[test]
fn invalid_markers_are_queryable() -> Result<()> {
    let mut page = page()?;
    page.assert_exists("#ageError")?;
    assert_eq!(
        page.assert_exists("#ageYearsError"),
        Err(Error::SelectorNotFound("#ageYearsError".into()))
    );
    assert!(!page.has_class("#fullName", "invalid")?);

    page.click("#submitBtn")?;
    assert!(page.has_class("#fullName", "invalid")?);
    assert!(page.has_class("#ageYears", "invalid")?);
    assert!(page.has_class("#ageMonths", "invalid")?);
    assert!(!page.has_class("#dog", "invalid")?);
    assert!(page.has_class("#fullNameError", "error-message")?);
    Ok(())
}

#[test]
fn checked_vet_records_render_yes() -> Result<()> {
    let mut page = page()?;
    fill_valid(&mut page)?;
    page.click("#vetChecked")?;
    page.click("#submitBtn")?;

    let summary = page.last_summary().expect("summary after valid submit");
    assert_eq!(summary.row("Vet Records Up-to-Date"), Some("Yes"));
    assert_eq!(summary.row("Quirks & Habits"), Some("None provided"));
    assert_eq!(
        summary
            .rows()
            .iter()
            .filter(|row| row.label == "Vet Records Up-to-Date")
            .count(),
        1
    );
    Ok(())
}

#[test]
fn empty_submit_shows_each_rule_once_and_scrolls_to_name() -> Result<()> {
    let mut page = page()?;
    page.click("#submitBtn")?;

    assert!(!page.overlay_visible());
    assert!(page.last_summary().is_none());
    assert!(page.take_console_logs().is_empty());
    assert_eq!(page.scroll_target_id().as_deref(), Some("fullName"));

    let report = page.last_report().expect("report after submit");
    assert_eq!(report.failures().len(), 8);
    assert_eq!(shown_error_count(&page)?, 8);
    page.assert_text("#fullNameError", "Pet name must be at least 2 characters.")?;
    page.assert_text(
        "#emailError",
        "Please enter a valid email address for the owner's contact.",
    )?;
    page.assert_text("#passwordError", "Password must be at least 8 characters long.")?;
    page.assert_text("#ageError", "Please enter a valid age (at least 1 month).")?;
    page.assert_text("#dobError", "The adoption date is required.")?;
    page.assert_text("#genderError", "Please select the pet species.")?;
    page.assert_text("#countryError", "Please select the pet's diet type.")?;
    page.assert_text("#profilePicError", "A pet photo is required.")?;
    page.assert_class("#ageYears", "invalid", true)?;
    page.assert_class("#ageMonths", "invalid", true)?;
    page.assert_class("#dog", "invalid", false)?;
    Ok(())
}

#[test]
fn capture_follows_rule_order() -> Result<()> {
    let mut page = page()?;
    fill_valid(&mut page)?;
    page.type_text("#dob", "")?;
    page.select_option("#country", "")?;
    page.click("#submitBtn")?;
    assert_eq!(page.scroll_target_id().as_deref(), Some("dob"));

    page.type_text("#dob", "2024-06-30")?;
    page.type_text("#password", "no digits here")?;
    page.click("#submitBtn")?;
    assert_eq!(page.scroll_target_id().as_deref(), Some("password"));
    page.assert_text("#passwordError", "Password should contain at least one number.")?;
    page.assert_text("#dobError", "")?;
    page.assert_text("#countryError", "Please select the pet's diet type.")?;
    Ok(())
}

#[test]
fn missing_photo_alone_never_scrolls() -> Result<()> {
    let mut page = page()?;
    fill_valid(&mut page)?;
    page.set_files("#profilePic", Vec::new())?;
    page.click("#submitBtn")?;

    assert!(!page.overlay_visible());
    assert_eq!(page.scroll_request(), None);
    page.assert_text("#profilePicError", "A pet photo is required.")?;
    page.assert_class("#profilePic", "invalid", true)?;
    Ok(())
}

#[test]
fn split_age_edge_cases() -> Result<()> {
    let cases = [
        ("0", "0", Some("Please enter a valid age (at least 1 month).")),
        ("", "", Some("Please enter a valid age (at least 1 month).")),
        ("0", "1", None),
        ("31", "0", Some("Pet's age cannot exceed 30 years.")),
        ("30", "11", None),
        ("-1", "6", Some("Please enter a valid age (at least 1 month).")),
        ("2", "-3", Some("Please enter a valid age (at least 1 month).")),
    ];
    for (years, months, expected) in cases {
        let mut page = page()?;
        fill_valid(&mut page)?;
        page.type_text("#ageYears", years)?;
        page.type_text("#ageMonths", months)?;
        page.click("#submitBtn")?;

        page.assert_text("#ageError", expected.unwrap_or(""))?;
        assert_eq!(page.overlay_visible(), expected.is_none(), "age {years}/{months}");
        let age_failures = page
            .last_report()
            .expect("report after submit")
            .failures()
            .iter()
            .filter(|failure| failure.source == FailureSource::Rule(FieldRole::AgeYears))
            .count();
        assert_eq!(age_failures, usize::from(expected.is_some()));
    }
    Ok(())
}

#[test]
fn too_old_keeps_months_unmarked() -> Result<()> {
    let mut page = page()?;
    fill_valid(&mut page)?;
    page.type_text("#ageYears", "31")?;
    page.type_text("#ageMonths", "0")?;
    page.click("#submitBtn")?;
    page.assert_class("#ageYears", "invalid", true)?;
    page.assert_class("#ageMonths", "invalid", false)?;
    assert_eq!(page.scroll_target_id().as_deref(), Some("ageYears"));
    Ok(())
}

#[test]
fn resubmit_clears_stale_errors_and_markers() -> Result<()> {
    let mut page = page()?;
    page.click("#submitBtn")?;
    assert_eq!(shown_error_count(&page)?, 8);

    fill_valid(&mut page)?;
    page.type_text("#email", "not-an-email")?;
    page.click("#submitBtn")?;
    assert_eq!(shown_error_count(&page)?, 1);
    page.assert_class("#fullName", "invalid", false)?;
    page.assert_class("#ageMonths", "invalid", false)?;
    page.assert_class("#email", "invalid", true)?;

    page.type_text("#email", "jo@shelter.org")?;
    page.click("#submitBtn")?;
    assert_eq!(shown_error_count(&page)?, 0);
    page.assert_class("#email", "invalid", false)?;
    assert!(page.overlay_visible());
    Ok(())
}

#[test]
fn native_constraints_add_failures_after_custom_rules() -> Result<()> {
    let mut page = page()?;
    fill_valid(&mut page)?;
    page.type_text("#microchip", "12ab")?;
    page.type_text("#notes", "this note is far longer than twenty characters")?;
    page.click("#submitBtn")?;

    let report = page.last_report().expect("report after submit");
    assert_eq!(report.native_failures().count(), 2);
    assert_eq!(shown_error_count(&page)?, 0);
    assert_eq!(page.scroll_target_id().as_deref(), Some("notes"));
    page.assert_class("#microchip", "invalid", true)?;
    assert!(!page.overlay_visible());

    page.type_text("#fullName", "B")?;
    page.click("#submitBtn")?;
    let report = page.last_report().expect("report after submit");
    assert_eq!(report.failures().len(), 3);
    assert_eq!(shown_error_count(&page)?, 1);
    assert_eq!(page.scroll_target_id().as_deref(), Some("fullName"));
    Ok(())
}

#[test]
fn each_close_control_resets_the_form() -> Result<()> {
    for close in ["#closeModalButton", "#okButton", "#confirmationModal"] {
        let mut page = page()?;
        fill_valid(&mut page)?;
        page.type_text("#satisfaction", "9")?;
        page.click("#vetChecked")?;
        page.click("#submitBtn")?;
        assert!(page.overlay_visible());

        page.click(close)?;
        assert!(!page.overlay_visible(), "{close} should close the overlay");
        page.assert_value("#fullName", "")?;
        page.assert_value("#ageYears", "")?;
        page.assert_value("#country", "")?;
        page.assert_checked("#dog", false)?;
        page.assert_checked("#vetChecked", false)?;
        page.assert_value("#satisfaction", "5")?;
        page.assert_text("#rangeValue", "5")?;
    }
    Ok(())
}

#[test]
fn clicks_inside_overlay_content_keep_it_open() -> Result<()> {
    let mut page = page()?;
    fill_valid(&mut page)?;
    page.click("#submitBtn")?;
    page.click("#modalDataOutput")?;
    page.click(".modal-content")?;
    assert!(page.overlay_visible());
    page.assert_value("#fullName", "Biscuit")?;
    Ok(())
}

#[test]
fn slider_readout_tracks_input_events() -> Result<()> {
    let mut page = page()?;
    page.type_text("#satisfaction", "3")?;
    page.assert_text("#rangeValue", "3")?;
    page.type_text("#satisfaction", "0")?;
    page.assert_value("#satisfaction", "1")?;
    page.assert_text("#rangeValue", "1")?;
    page.dispatch("#satisfaction", "change")?;
    page.assert_text("#rangeValue", "1")?;
    Ok(())
}

#[test]
fn assertion_failures_carry_a_snippet() -> Result<()> {
    let page = page()?;
    match page.assert_text("#rangeValue", "7") {
        Err(Error::AssertionFailed {
            expected,
            actual,
            dom_snippet,
            ..
        }) => {
            assert_eq!(expected, "7");
            assert_eq!(actual, "5");
            assert!(dom_snippet.starts_with("<span id=\"rangeValue\">"));
        }
        other => panic!("expected assertion failure, got: {other:?}"),
    }
    Ok(())
}
