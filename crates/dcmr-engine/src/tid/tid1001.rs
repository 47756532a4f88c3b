//! TID 1001 Observation Context, with the observer (TID 1002-1004),
//! procedure (TID 1005) and subject (TID 1006/1007) context rows.
//!
//! The template has no root container: its rows are top-level siblings that
//! get included below the container of another template.

use dcmr_types::codes::dcm;
use dcmr_types::{AddMode, CodedEntry, RelationshipType, ValueType};

use super::{add_row, selected_entry, Row, RowValue};
use crate::cid::{DeviceParticipatingRole, OrganizationalRole, PerformingRole};
use crate::context_group::ContextGroup;
use crate::template::{SubTemplate, Template};
use crate::tree::ContentTree;
use crate::types::{CmrError, CmrResult};

const LAST_OBSERVER: usize = 0;
const LAST_PROCEDURE_CONTEXT: usize = 1;
const LAST_SUBJECT_CONTEXT: usize = 2;
const NUMBER_OF_SLOTS: usize = 3;

/// Observer type (TID 1002 Row 1).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObserverType {
    /// A person.
    Person,
    /// A device.
    Device,
}

impl ObserverType {
    /// The coded value of the observer type row.
    pub fn code(self) -> CodedEntry {
        match self {
            Self::Person => dcm::PERSON,
            Self::Device => dcm::DEVICE,
        }
    }
}

/// Subject class (TID 1006 Row 1).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubjectClass {
    /// The patient (TID 1007).
    Patient,
    /// A fetus (TID 1008).
    Fetus,
    /// A specimen (TID 1009).
    Specimen,
    /// A device (TID 1010).
    Device,
}

impl SubjectClass {
    /// The coded value of the subject class row.
    pub fn code(self) -> CodedEntry {
        match self {
            Self::Patient => dcm::PATIENT,
            Self::Fetus => dcm::FETUS,
            Self::Specimen => dcm::SPECIMEN,
            Self::Device => dcm::DEVICE,
        }
    }
}

/// Attributes of a person observer (TID 1003). Only the name is mandatory.
#[derive(Debug, Clone, Default)]
pub struct PersonObserver {
    /// Person observer name (PN).
    pub name: String,
    /// Person observer's organization name.
    pub organization_name: String,
    /// Person observer's role in the organization (BCID 7452).
    pub organization_role: ContextGroup<OrganizationalRole>,
    /// Person observer's role in this procedure (BCID 7453).
    pub procedure_role: ContextGroup<PerformingRole>,
}

impl PersonObserver {
    /// A person observer with just a name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
}

/// Attributes of a device observer (TID 1004). Only the UID is mandatory.
#[derive(Debug, Clone, Default)]
pub struct DeviceObserver {
    /// Device observer UID.
    pub uid: String,
    /// Device observer name.
    pub name: String,
    /// Device observer manufacturer.
    pub manufacturer: String,
    /// Device observer model name.
    pub model_name: String,
    /// Device observer serial number.
    pub serial_number: String,
    /// Device observer physical location during observation.
    pub physical_location: String,
    /// Device roles in the procedure (DCID 7445), one row each.
    pub roles: Vec<ContextGroup<DeviceParticipatingRole>>,
    /// Station AE title.
    pub station_ae_title: String,
}

impl DeviceObserver {
    /// A device observer with just a UID.
    pub fn new(uid: impl Into<String>) -> Self {
        Self {
            uid: uid.into(),
            ..Default::default()
        }
    }
}

/// Procedure context (TID 1005).
#[derive(Debug, Clone, Default)]
pub struct ProcedureContext {
    /// Procedure study instance UID (mandatory).
    pub study_instance_uid: String,
    /// Procedure study component UID.
    pub study_component_uid: String,
    /// Placer number.
    pub placer_number: String,
    /// Filler number.
    pub filler_number: String,
    /// Accession number.
    pub accession_number: String,
}

/// Patient subject (TID 1007).
#[derive(Debug, Clone, Default)]
pub struct PatientSubject {
    /// Subject UID.
    pub uid: String,
    /// Subject name (PN).
    pub name: String,
    /// Subject ID.
    pub id: String,
    /// Subject birth date (DA).
    pub birth_date: String,
}

/// Observation Context (TID 1001).
#[derive(Debug, Clone)]
pub struct Tid1001ObservationContext {
    template: SubTemplate,
}

impl Default for Tid1001ObservationContext {
    fn default() -> Self {
        Self::new()
    }
}

impl Tid1001ObservationContext {
    /// Creates an empty template.
    pub fn new() -> Self {
        Self {
            template: SubTemplate::new("1001", true, false).with_slots(NUMBER_OF_SLOTS),
        }
    }

    /// Returns true if the tree has at least one observer type row.
    pub fn has_observer(&self) -> bool {
        self.has_top_level_row(&dcm::OBSERVER_TYPE, ValueType::Code)
    }

    /// Returns true if the tree has a procedure study instance UID row.
    pub fn has_procedure_context(&self) -> bool {
        self.has_top_level_row(&dcm::PROCEDURE_STUDY_INSTANCE_UID, ValueType::UidRef)
    }

    /// Returns true if the tree has a subject class row.
    pub fn has_subject_context(&self) -> bool {
        self.has_top_level_row(&dcm::SUBJECT_CLASS, ValueType::Code)
    }

    fn has_top_level_row(&self, concept: &CodedEntry, value_type: ValueType) -> bool {
        let tree = self.template.tree();
        tree.roots()
            .iter()
            .filter_map(|&id| tree.item(id))
            .any(|item| item.value_type() == value_type && item.concept_name() == concept)
    }

    /// Adds a person observer (TID 1002 with TID 1003).
    ///
    /// # Errors
    /// `InvalidValue` if the name is empty or a value is malformed;
    /// `CodedEntryNotInContextGroup` / `InvalidValue` for a bad role when
    /// `check` is set. Nothing is added on error.
    pub fn add_person_observer(&mut self, person: &PersonObserver, check: bool) -> CmrResult<()> {
        if person.name.is_empty() {
            return Err(CmrError::InvalidValue);
        }
        let mut rows = ContentTree::new();
        observer_type_row(&mut rows, ObserverType::Person, check)?;
        add_row(
            &mut rows,
            AddMode::AfterCurrent,
            Row::new(RelationshipType::HasObsContext, &dcm::PERSON_OBSERVER_NAME, "TID 1003 - Row 1"),
            RowValue::Text(ValueType::PName, person.name.clone()),
            check,
        )?;
        if !person.organization_name.is_empty() {
            add_row(
                &mut rows,
                AddMode::AfterCurrent,
                Row::new(
                    RelationshipType::HasObsContext,
                    &dcm::PERSON_OBSERVER_ORGANIZATION_NAME,
                    "TID 1003 - Row 2",
                ),
                RowValue::text(person.organization_name.clone()),
                check,
            )?;
        }
        if person.organization_role.has_selected_value() {
            add_row(
                &mut rows,
                AddMode::AfterCurrent,
                Row::new(
                    RelationshipType::HasObsContext,
                    &dcm::PERSON_OBSERVER_ROLE_IN_ORGANIZATION,
                    "TID 1003 - Row 3",
                ),
                RowValue::Code(selected_entry(&person.organization_role, false, check)?),
                check,
            )?;
        }
        if person.procedure_role.has_selected_value() {
            add_row(
                &mut rows,
                AddMode::AfterCurrent,
                Row::new(
                    RelationshipType::HasObsContext,
                    &dcm::PERSON_OBSERVER_ROLE_IN_PROCEDURE,
                    "TID 1003 - Row 4",
                ),
                RowValue::Code(selected_entry(&person.procedure_role, false, check)?),
                check,
            )?;
        }
        self.insert_rows(LAST_OBSERVER, rows)
    }

    /// Adds a device observer (TID 1002 with TID 1004).
    ///
    /// # Errors
    /// `InvalidValue` if the UID is empty or a value is malformed. Nothing is
    /// added on error.
    pub fn add_device_observer(&mut self, device: &DeviceObserver, check: bool) -> CmrResult<()> {
        if device.uid.is_empty() {
            return Err(CmrError::InvalidValue);
        }
        let mut rows = ContentTree::new();
        observer_type_row(&mut rows, ObserverType::Device, check)?;
        add_row(
            &mut rows,
            AddMode::AfterCurrent,
            Row::new(RelationshipType::HasObsContext, &dcm::DEVICE_OBSERVER_UID, "TID 1004 - Row 1"),
            RowValue::Text(ValueType::UidRef, device.uid.clone()),
            check,
        )?;
        let optional_text = [
            (&device.name, &dcm::DEVICE_OBSERVER_NAME, "TID 1004 - Row 2"),
            (&device.manufacturer, &dcm::DEVICE_OBSERVER_MANUFACTURER, "TID 1004 - Row 3"),
            (&device.model_name, &dcm::DEVICE_OBSERVER_MODEL_NAME, "TID 1004 - Row 4"),
            (&device.serial_number, &dcm::DEVICE_OBSERVER_SERIAL_NUMBER, "TID 1004 - Row 5"),
            (
                &device.physical_location,
                &dcm::DEVICE_OBSERVER_PHYSICAL_LOCATION,
                "TID 1004 - Row 6",
            ),
        ];
        for (value, concept, annotation) in optional_text {
            if !value.is_empty() {
                add_row(
                    &mut rows,
                    AddMode::AfterCurrent,
                    Row::new(RelationshipType::HasObsContext, concept, annotation),
                    RowValue::text(value.clone()),
                    check,
                )?;
            }
        }
        for role in device.roles.iter().filter(|role| role.has_selected_value()) {
            add_row(
                &mut rows,
                AddMode::AfterCurrent,
                Row::new(RelationshipType::HasObsContext, &dcm::DEVICE_ROLE_IN_PROCEDURE, "TID 1004 - Row 7"),
                RowValue::Code(selected_entry(role, true, check)?),
                check,
            )?;
        }
        if !device.station_ae_title.is_empty() {
            add_row(
                &mut rows,
                AddMode::AfterCurrent,
                Row::new(RelationshipType::HasObsContext, &dcm::STATION_AE_TITLE, "TID 1004 - Row 8"),
                RowValue::text(device.station_ae_title.clone()),
                check,
            )?;
        }
        self.insert_rows(LAST_OBSERVER, rows)
    }

    /// Adds the procedure context (TID 1005).
    pub fn add_procedure_context(&mut self, procedure: &ProcedureContext, check: bool) -> CmrResult<()> {
        if procedure.study_instance_uid.is_empty() {
            return Err(CmrError::InvalidValue);
        }
        let mut rows = ContentTree::new();
        add_row(
            &mut rows,
            AddMode::AfterCurrent,
            Row::new(
                RelationshipType::HasObsContext,
                &dcm::PROCEDURE_STUDY_INSTANCE_UID,
                "TID 1005 - Row 1",
            ),
            RowValue::Text(ValueType::UidRef, procedure.study_instance_uid.clone()),
            check,
        )?;
        if !procedure.study_component_uid.is_empty() {
            add_row(
                &mut rows,
                AddMode::AfterCurrent,
                Row::new(
                    RelationshipType::HasObsContext,
                    &dcm::PROCEDURE_STUDY_COMPONENT_UID,
                    "TID 1005 - Row 2",
                ),
                RowValue::Text(ValueType::UidRef, procedure.study_component_uid.clone()),
                check,
            )?;
        }
        let numbers = [
            (&procedure.placer_number, &dcm::PLACER_NUMBER, "TID 1005 - Row 3"),
            (&procedure.filler_number, &dcm::FILLER_NUMBER, "TID 1005 - Row 4"),
            (&procedure.accession_number, &dcm::ACCESSION_NUMBER, "TID 1005 - Row 5"),
        ];
        for (value, concept, annotation) in numbers {
            if !value.is_empty() {
                add_row(
                    &mut rows,
                    AddMode::AfterCurrent,
                    Row::new(RelationshipType::HasObsContext, concept, annotation),
                    RowValue::text(value.clone()),
                    check,
                )?;
            }
        }
        self.insert_rows(LAST_PROCEDURE_CONTEXT, rows)
    }

    /// Adds the subject context (TID 1006). Only patient subjects (TID 1007)
    /// are supported.
    ///
    /// # Errors
    /// `NotYetImplemented` for fetus, specimen and device subjects.
    pub fn add_subject_context(
        &mut self,
        class: SubjectClass,
        patient: &PatientSubject,
        check: bool,
    ) -> CmrResult<()> {
        match class {
            SubjectClass::Patient => {}
            SubjectClass::Fetus => return Err(CmrError::NotYetImplemented("fetus subject context")),
            SubjectClass::Specimen => {
                return Err(CmrError::NotYetImplemented("specimen subject context"))
            }
            SubjectClass::Device => return Err(CmrError::NotYetImplemented("device subject context")),
        }
        let mut rows = ContentTree::new();
        add_row(
            &mut rows,
            AddMode::AfterCurrent,
            Row::new(RelationshipType::HasObsContext, &dcm::SUBJECT_CLASS, "TID 1006 - Row 1"),
            RowValue::Code(class.code()),
            check,
        )?;
        let values = [
            (ValueType::UidRef, &patient.uid, &dcm::SUBJECT_UID, "TID 1007 - Row 1"),
            (ValueType::PName, &patient.name, &dcm::SUBJECT_NAME, "TID 1007 - Row 2"),
            (ValueType::Text, &patient.id, &dcm::SUBJECT_ID, "TID 1007 - Row 3"),
            (ValueType::Date, &patient.birth_date, &dcm::SUBJECT_BIRTH_DATE, "TID 1007 - Row 4"),
        ];
        for (value_type, value, concept, annotation) in values {
            if !value.is_empty() {
                add_row(
                    &mut rows,
                    AddMode::AfterCurrent,
                    Row::new(RelationshipType::HasObsContext, concept, annotation),
                    RowValue::Text(value_type, value.clone()),
                    check,
                )?;
            }
        }
        self.insert_rows(LAST_SUBJECT_CONTEXT, rows)
    }

    /// Splices staged top-level rows after the rows of `slot` (or of the
    /// nearest section before it) and remembers their last node.
    fn insert_rows(&mut self, slot: usize, mut rows: ContentTree) -> CmrResult<()> {
        let last = rows
            .roots()
            .last()
            .copied()
            .ok_or(CmrError::InvalidTemplateStructure)?;
        let mode = if self.template.goto_last_slot(slot).is_some() {
            AddMode::AfterCurrent
        } else if self.template.tree_mut().goto_root().is_some() {
            AddMode::BeforeCurrent
        } else {
            AddMode::AfterCurrent
        };
        self.template
            .tree_mut()
            .insert_sub_tree(&mut rows, mode, RelationshipType::HasObsContext)?;
        self.template.store(slot, Some(last));
        Ok(())
    }
}

fn observer_type_row(rows: &mut ContentTree, observer: ObserverType, check: bool) -> CmrResult<()> {
    add_row(
        rows,
        AddMode::AfterCurrent,
        Row::new(RelationshipType::HasObsContext, &dcm::OBSERVER_TYPE, "TID 1002 - Row 1"),
        RowValue::Code(observer.code()),
        check,
    )?;
    Ok(())
}

impl Template for Tid1001ObservationContext {
    fn sub_template(&self) -> &SubTemplate {
        &self.template
    }

    fn sub_template_mut(&mut self) -> &mut SubTemplate {
        &mut self.template
    }

    fn is_valid(&self) -> bool {
        self.template.is_valid() && self.has_observer()
    }
}
