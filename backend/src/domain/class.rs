//! Class roster aggregate.
//!
//! A class has exactly one owning teacher and an enrolment set in which each
//! student appears at most once. Enrolment order is preserved for display
//! but carries no meaning.

use std::collections::HashSet;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::UserId;

/// Maximum length of a class name, in characters.
pub const CLASS_NAME_MAX: usize = 120;
/// Maximum length of a class description, in characters.
pub const CLASS_DESCRIPTION_MAX: usize = 1000;

/// Validation errors raised by the roster aggregate.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClassValidationError {
    #[error("class name must not be empty")]
    EmptyName,
    #[error("class name must be at most {max} characters")]
    NameTooLong { max: usize },
    #[error("class description must be at most {max} characters")]
    DescriptionTooLong { max: usize },
    #[error("all selected students are already assigned to this class")]
    NothingToEnrol,
}

/// Stable class identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClassId(Uuid);

impl ClassId {
    /// Generate a new random [`ClassId`].
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap an existing UUID.
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for ClassId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Class name, trimmed and non-empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassName(String);

impl ClassName {
    /// Validate and construct a [`ClassName`].
    ///
    /// # Examples
    /// ```
    /// use rollcall::domain::ClassName;
    ///
    /// assert_eq!(ClassName::new(" Math101 ").unwrap().as_ref(), "Math101");
    /// assert!(ClassName::new("   ").is_err());
    /// ```
    pub fn new(name: impl Into<String>) -> Result<Self, ClassValidationError> {
        let name = name.into();
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(ClassValidationError::EmptyName);
        }
        if trimmed.chars().count() > CLASS_NAME_MAX {
            return Err(ClassValidationError::NameTooLong {
                max: CLASS_NAME_MAX,
            });
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for ClassName {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

/// Optional free-text class description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassDescription(String);

impl ClassDescription {
    /// Validate a description. Blank input yields `None`.
    pub fn parse(description: impl Into<String>) -> Result<Option<Self>, ClassValidationError> {
        let description = description.into();
        let trimmed = description.trim();
        if trimmed.is_empty() {
            return Ok(None);
        }
        if trimmed.chars().count() > CLASS_DESCRIPTION_MAX {
            return Err(ClassValidationError::DescriptionTooLong {
                max: CLASS_DESCRIPTION_MAX,
            });
        }
        Ok(Some(Self(trimmed.to_owned())))
    }
}

impl AsRef<str> for ClassDescription {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

/// Raw parts used to rehydrate a [`Class`] from storage.
#[derive(Debug, Clone)]
pub struct ClassDraft {
    pub id: ClassId,
    pub name: ClassName,
    pub description: Option<ClassDescription>,
    pub teacher_id: UserId,
    pub student_ids: Vec<UserId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A teacher-owned class and its enrolment set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Class {
    id: ClassId,
    name: ClassName,
    description: Option<ClassDescription>,
    teacher_id: UserId,
    student_ids: Vec<UserId>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Class {
    /// Create a new class with an empty enrolment set.
    pub fn create(
        id: ClassId,
        name: ClassName,
        description: Option<ClassDescription>,
        teacher_id: UserId,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            name,
            description,
            teacher_id,
            student_ids: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Rehydrate a class, dropping duplicate enrolments.
    pub fn from_draft(draft: ClassDraft) -> Self {
        let mut seen = HashSet::with_capacity(draft.student_ids.len());
        let student_ids = draft
            .student_ids
            .into_iter()
            .filter(|id| seen.insert(*id))
            .collect();
        Self {
            id: draft.id,
            name: draft.name,
            description: draft.description,
            teacher_id: draft.teacher_id,
            student_ids,
            created_at: draft.created_at,
            updated_at: draft.updated_at,
        }
    }

    pub fn id(&self) -> ClassId {
        self.id
    }

    pub fn name(&self) -> &ClassName {
        &self.name
    }

    pub fn description(&self) -> Option<&ClassDescription> {
        self.description.as_ref()
    }

    pub fn teacher_id(&self) -> UserId {
        self.teacher_id
    }

    pub fn student_ids(&self) -> &[UserId] {
        &self.student_ids
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Whether `user` is the owning teacher.
    pub fn is_owned_by(&self, user: &UserId) -> bool {
        self.teacher_id == *user
    }

    /// Whether `student` is enrolled.
    pub fn is_enrolled(&self, student: &UserId) -> bool {
        self.student_ids.contains(student)
    }

    pub fn rename(&mut self, name: ClassName, now: DateTime<Utc>) {
        self.name = name;
        self.updated_at = now;
    }

    pub fn set_description(&mut self, description: Option<ClassDescription>, now: DateTime<Utc>) {
        self.description = description;
        self.updated_at = now;
    }

    /// Candidates that would actually be added, in first-seen order.
    ///
    /// Already enrolled ids and repeats within `candidates` are dropped.
    ///
    /// # Examples
    /// ```
    /// use chrono::Utc;
    /// use rollcall::domain::{Class, ClassId, ClassName, UserId};
    ///
    /// let (s1, s2) = (UserId::random(), UserId::random());
    /// let mut class = Class::create(
    ///     ClassId::random(),
    ///     ClassName::new("Math101").unwrap(),
    ///     None,
    ///     UserId::random(),
    ///     Utc::now(),
    /// );
    /// class.enroll(&[s1], Utc::now()).unwrap();
    /// assert_eq!(class.pending_enrolments(&[s1, s1, s2]), vec![s2]);
    /// ```
    pub fn pending_enrolments(&self, candidates: &[UserId]) -> Vec<UserId> {
        let mut seen: HashSet<UserId> = self.student_ids.iter().copied().collect();
        candidates
            .iter()
            .copied()
            .filter(|id| seen.insert(*id))
            .collect()
    }

    /// Enrol the candidates that are not yet enrolled.
    ///
    /// Returns the ids actually added. Fails with
    /// [`ClassValidationError::NothingToEnrol`] when every candidate is
    /// already enrolled, leaving the class untouched.
    pub fn enroll(
        &mut self,
        candidates: &[UserId],
        now: DateTime<Utc>,
    ) -> Result<Vec<UserId>, ClassValidationError> {
        let added = self.pending_enrolments(candidates);
        if added.is_empty() {
            return Err(ClassValidationError::NothingToEnrol);
        }
        self.student_ids.extend(added.iter().copied());
        self.updated_at = now;
        Ok(added)
    }

    /// Remove `student` from the enrolment set.
    ///
    /// Returns `false` without touching the class when the student was not
    /// enrolled.
    pub fn withdraw(&mut self, student: &UserId, now: DateTime<Utc>) -> bool {
        let before = self.student_ids.len();
        self.student_ids.retain(|id| id != student);
        let removed = self.student_ids.len() != before;
        if removed {
            self.updated_at = now;
        }
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use rstest::{fixture, rstest};

    #[fixture]
    fn class() -> Class {
        Class::create(
            ClassId::random(),
            ClassName::new("Math101").expect("valid name"),
            None,
            UserId::random(),
            Utc::now(),
        )
    }

    #[rstest]
    fn create_starts_with_empty_enrolment(class: Class) {
        assert!(class.student_ids().is_empty());
        assert_eq!(class.created_at(), class.updated_at());
    }

    #[rstest]
    #[case("")]
    #[case("  \t ")]
    fn class_name_rejects_blank(#[case] raw: &str) {
        assert_eq!(ClassName::new(raw), Err(ClassValidationError::EmptyName));
    }

    #[rstest]
    fn description_blank_is_none() {
        assert_eq!(ClassDescription::parse("   "), Ok(None));
        let parsed = ClassDescription::parse(" algebra ").expect("valid description");
        assert_eq!(parsed.as_ref().map(|d| d.as_ref()), Some("algebra"));
    }

    #[rstest]
    fn enroll_dedups_against_existing_and_batch(mut class: Class) {
        let (s1, s2) = (UserId::random(), UserId::random());
        class.enroll(&[s1], Utc::now()).expect("first enrolment");

        let added = class.enroll(&[s1, s1, s2, s2], Utc::now()).expect("second");

        assert_eq!(added, vec![s2]);
        assert_eq!(class.student_ids(), &[s1, s2]);
    }

    #[rstest]
    fn enroll_rejects_all_duplicates_without_change(mut class: Class) {
        let s1 = UserId::random();
        class.enroll(&[s1], Utc::now()).expect("first enrolment");
        let before = class.clone();

        let result = class.enroll(&[s1, s1], Utc::now() + Duration::minutes(1));

        assert_eq!(result, Err(ClassValidationError::NothingToEnrol));
        assert_eq!(class, before);
    }

    #[rstest]
    fn enroll_rejects_empty_batch(mut class: Class) {
        assert_eq!(
            class.enroll(&[], Utc::now()),
            Err(ClassValidationError::NothingToEnrol)
        );
    }

    #[rstest]
    fn withdraw_is_idempotent(mut class: Class) {
        let s1 = UserId::random();
        class.enroll(&[s1], Utc::now()).expect("enrolment");
        let later = Utc::now() + Duration::minutes(5);

        assert!(class.withdraw(&s1, later));
        assert!(!class.withdraw(&s1, later + Duration::minutes(5)));
        assert!(!class.is_enrolled(&s1));
        assert_eq!(class.updated_at(), later);
    }

    #[rstest]
    fn from_draft_drops_duplicate_enrolments(class: Class) {
        let s1 = UserId::random();
        let rebuilt = Class::from_draft(ClassDraft {
            id: class.id(),
            name: class.name().clone(),
            description: None,
            teacher_id: class.teacher_id(),
            student_ids: vec![s1, s1],
            created_at: class.created_at(),
            updated_at: class.updated_at(),
        });
        assert_eq!(rebuilt.student_ids(), &[s1]);
    }

    #[rstest]
    fn ownership_is_by_teacher_id(class: Class) {
        assert!(class.is_owned_by(&class.teacher_id()));
        assert!(!class.is_owned_by(&UserId::random()));
    }
}
