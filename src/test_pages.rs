use super::*;
use crate::dom::Dom;
use crate::form_controls::MockFile;

pub(crate) const SPLIT_AGE_PAGE: &str = r#"
<form id="surveyForm" action="confirmation.html" novalidate>
  <input type="hidden" name="formType" value="adoption">
  <input type="text" id="fullName" name="petName">
  <span class="error-message" id="fullNameError"></span>
  <input type="email" id="email" name="ownerEmail">
  <span class="error-message" id="emailError"></span>
  <input type="password" id="password" name="password">
  <span class="error-message" id="passwordError"></span>
  <input type="number" id="ageYears" name="petAgeYears">
  <input type="number" id="ageMonths" name="petAgeMonths">
  <span class="error-message" id="ageError"></span>
  <input type="date" id="dob" name="adoptionDate">
  <span class="error-message" id="dobError"></span>
  <input type="range" id="satisfaction" name="energyLevel" min="1" max="10" value="5">
  <span id="rangeValue">5</span>
  <input type="radio" id="dog" name="species" value="Dog">
  <input type="radio" id="cat" name="species" value="Cat">
  <input type="radio" id="other" name="species" value="Other">
  <span class="error-message" id="genderError"></span>
  <select id="country" name="dietType">
    <option value="">Select a diet</option>
    <option value="Dry Food">Dry Food</option>
    <option value="Wet Food">Wet Food</option>
  </select>
  <span class="error-message" id="countryError"></span>
  <input type="file" id="profilePic" name="petPhoto">
  <span class="error-message" id="profilePicError"></span>
  <input type="checkbox" id="vetChecked" name="vetChecked" value="yes">
  <textarea id="notes" name="notes" minlength="3"></textarea>
  <button type="submit" id="submitBtn">Submit</button>
</form>
<div id="confirmationModal" style="display: none;">
  <span id="closeModalButton">x</span>
  <div id="modalDataOutput"></div>
  <button type="button" id="okButton">OK</button>
</div>
"#;

pub(crate) const SINGLE_AGE_PAGE: &str = r#"
<form id="surveyForm" action="confirmation.html" novalidate>
  <input type="text" id="fullName" name="petName">
  <span class="error-message" id="fullNameError"></span>
  <input type="email" id="email" name="ownerEmail">
  <span class="error-message" id="emailError"></span>
  <input type="password" id="password" name="password">
  <span class="error-message" id="passwordError"></span>
  <input type="number" id="age" name="petAge">
  <span class="error-message" id="ageError"></span>
  <input type="date" id="dob" name="adoptionDate">
  <span class="error-message" id="dobError"></span>
  <input type="radio" id="dog" name="species" value="Dog">
  <input type="radio" id="cat" name="species" value="Cat">
  <span class="error-message" id="genderError"></span>
  <select id="country" name="dietType">
    <option value="">Select a diet</option>
    <option value="Raw">Raw</option>
  </select>
  <span class="error-message" id="countryError"></span>
  <input type="file" id="profilePic" name="petPhoto">
  <span class="error-message" id="profilePicError"></span>
  <button type="submit" id="submitBtn">Submit</button>
</form>
"#;

/// Fills every ruled field of [`SPLIT_AGE_PAGE`] with an acceptable value.
pub(crate) fn fill_valid_split_form(dom: &mut Dom) -> Result<()> {
    let lookup = |dom: &Dom, id: &str| {
        dom.by_id(id)
            .ok_or_else(|| Error::MissingElement(id.to_string()))
    };
    for (id, value) in [
        ("fullName", "Luna"),
        ("email", "owner@example.com"),
        ("password", "secret123"),
        ("ageYears", "2"),
        ("ageMonths", "5"),
        ("dob", "2024-03-01"),
    ] {
        let node = lookup(dom, id)?;
        dom.set_value(node, value)?;
    }
    let dog = lookup(dom, "dog")?;
    dom.set_checked(dog, true)?;
    let diet = lookup(dom, "country")?;
    dom.select_option(diet, "Dry Food")?;
    let photo = lookup(dom, "profilePic")?;
    dom.set_files(photo, vec![MockFile::new("luna.png", 2048)])?;
    Ok(())
}
