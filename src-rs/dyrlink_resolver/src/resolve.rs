//! Resolution of a single record.
//!
//! Resolution never recurses: a find rule only queries devices already in
//! the index, and the record being resolved is not registered until every
//! phase has succeeded. A relation chain can therefore never lead back to
//! the record itself.

use indexmap::IndexMap;

use dyrlink_index::{DeviceIndex, FindResult, Predicate};
use dyrlink_ir::{DeviceKey, DeviceRef, FieldName, RawRecord, RelationName, ResolvedDevice, Value};
use dyrlink_schema::{FindRule, GetRule, GetSource, IdentityRule, RuleSet, SchemaRegistry, Source};

use crate::{
    error::{ResolutionError, ResolutionFailure},
    stage::ResolutionStage,
};

/// Values bound while resolving one record.
struct Bindings<'r> {
    record: &'r RawRecord,
    relations: IndexMap<RelationName, Value>,
    gets: IndexMap<FieldName, Value>,
}

impl<'r> Bindings<'r> {
    fn new(record: &'r RawRecord) -> Self {
        Self {
            record,
            relations: IndexMap::new(),
            gets: IndexMap::new(),
        }
    }

    /// Returns the value a source refers to.
    ///
    /// Compiled rule sets only refer to names bound by earlier rules, so a
    /// lookup that finds nothing yields the absent value.
    fn value_of(&self, source: &Source) -> Value {
        let value = match source {
            Source::Input(field) => self.record.get(field),
            Source::Relation(relation) => self.relations.get(relation),
            Source::Get(field) => self.gets.get(field),
            Source::Constant(value) => Some(value),
        };
        value.cloned().unwrap_or(Value::Absent)
    }

    fn relation(&self, relation: &RelationName) -> Option<&DeviceRef> {
        self.relations.get(relation).and_then(Value::as_device)
    }
}

/// Resolves a record and registers the resulting device.
///
/// # Errors
///
/// Returns the first error encountered, together with the stage it
/// occurred in. Nothing is registered if resolution fails.
pub fn resolve_record(
    record: &RawRecord,
    registry: &SchemaRegistry,
    index: &mut DeviceIndex,
) -> Result<DeviceRef, ResolutionFailure> {
    let device = resolve(record, registry, index)?;
    instantiate(device, index)
}

/// Resolves a record into a device without registering it.
///
/// # Errors
///
/// Returns the first error encountered, together with the stage it
/// occurred in.
pub fn resolve(
    record: &RawRecord,
    registry: &SchemaRegistry,
    index: &DeviceIndex,
) -> Result<ResolvedDevice, ResolutionFailure> {
    let rule_set = registry
        .lookup(record.model_type())
        .map_err(|_| ResolutionError::unknown_model_type(record.model_type().clone()))
        .map_err(failed_at(ResolutionStage::Validated))?;

    validate(rule_set, record).map_err(failed_at(ResolutionStage::Validated))?;

    let mut bindings = Bindings::new(record);

    for find in rule_set.finds() {
        let value = resolve_find(find, &bindings, registry, index)
            .map_err(failed_at(ResolutionStage::FindResolved))?;
        bindings.relations.insert(find.relation().clone(), value);
    }

    for get in rule_set.gets() {
        let value =
            gather_attribute(get, &bindings, index).map_err(failed_at(ResolutionStage::AttributesGathered))?;
        bindings.gets.insert(get.field().clone(), value);
    }

    let outputs =
        compute_outputs(rule_set, &bindings).map_err(failed_at(ResolutionStage::OutputsComputed))?;

    let key = identity_key(rule_set, &bindings).map_err(failed_at(ResolutionStage::Instantiated))?;

    tracing::trace!(
        model = %rule_set.model_type(),
        key = %key,
        relations = bindings.relations.len(),
        "resolved record"
    );

    Ok(ResolvedDevice::new(
        rule_set.destination().clone(),
        key,
        outputs,
    ))
}

/// Registers a resolved device into the index.
///
/// # Errors
///
/// Returns `ResolutionError::DuplicateKey` if a device with the same type and
/// key is already registered.
pub fn instantiate(
    device: ResolvedDevice,
    index: &mut DeviceIndex,
) -> Result<DeviceRef, ResolutionFailure> {
    index
        .register(device)
        .map_err(|error| ResolutionError::from_index_error("", error))
        .map_err(failed_at(ResolutionStage::Instantiated))
}

fn failed_at(stage: ResolutionStage) -> impl FnOnce(ResolutionError) -> ResolutionFailure {
    move |error| ResolutionFailure::new(stage, error)
}

fn validate(rule_set: &RuleSet, record: &RawRecord) -> Result<(), ResolutionError> {
    let missing = rule_set
        .inputs()
        .iter()
        .find(|input| record.get(input).is_none());

    match missing {
        Some(field) => Err(ResolutionError::missing_field(
            rule_set.model_type().clone(),
            field.clone(),
        )),
        None => Ok(()),
    }
}

fn resolve_find(
    find: &FindRule,
    bindings: &Bindings<'_>,
    registry: &SchemaRegistry,
    index: &DeviceIndex,
) -> Result<Value, ResolutionError> {
    let predicate = find
        .clauses()
        .iter()
        .fold(Predicate::new(), |predicate, clause| {
            predicate.with(clause.field().clone(), bindings.value_of(clause.source()))
        });

    let members = registry.members_of(find.target());

    match index.find_one(members, &predicate) {
        FindResult::Found(device) => Ok(Value::Device(device.to_ref())),
        FindResult::NotFound if find.allow_none() => Ok(Value::Absent),
        FindResult::NotFound => Err(ResolutionError::unresolved_reference(
            find.relation().to_string(),
            find.target().clone(),
            predicate.to_string(),
        )),
        FindResult::Ambiguous(candidates) => Err(ResolutionError::ambiguous_reference(
            find.relation().to_string(),
            find.target().clone(),
            predicate.to_string(),
            candidates,
        )),
    }
}

fn gather_attribute(
    get: &GetRule,
    bindings: &Bindings<'_>,
    index: &DeviceIndex,
) -> Result<Value, ResolutionError> {
    let device = match get.source() {
        // an allow-none relation that matched nothing
        GetSource::Relation(relation) => match bindings.relation(relation) {
            Some(device) => device.clone(),
            None => return Ok(Value::Absent),
        },
        GetSource::Keyed { device_type, key } => {
            let Some(key) = bindings.value_of(key).to_key() else {
                return Ok(Value::Absent);
            };
            DeviceRef::new(device_type.clone(), key)
        }
    };

    index
        .get_attribute(device.device_type(), device.key(), get.src())
        .cloned()
        .map_err(|error| ResolutionError::from_index_error(get.field().as_str(), error))
}

fn compute_outputs(
    rule_set: &RuleSet,
    bindings: &Bindings<'_>,
) -> Result<IndexMap<FieldName, Value>, ResolutionError> {
    rule_set
        .outputs()
        .iter()
        .map(|output| {
            let value = bindings.value_of(output.source());
            let value = output
                .transform()
                .apply(value)
                .map_err(|error| ResolutionError::transform(output.field().clone(), error))?;
            Ok((output.field().clone(), value))
        })
        .collect()
}

fn identity_key(rule_set: &RuleSet, bindings: &Bindings<'_>) -> Result<DeviceKey, ResolutionError> {
    match rule_set.identity() {
        IdentityRule::Fields(sources) => {
            let values = sources
                .iter()
                .map(|source| bindings.value_of(source))
                .collect::<Vec<_>>();

            DeviceKey::compose(&values).ok_or_else(|| {
                let rendered = values
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(", ");
                ResolutionError::invalid_identity(
                    rule_set.model_type().clone(),
                    format!("identity values ({rendered}) cannot form a key"),
                )
            })
        }
        IdentityRule::Relation(relation) => bindings
            .relation(relation)
            .map(|device| device.key().clone())
            .ok_or_else(|| {
                ResolutionError::invalid_identity(
                    rule_set.model_type().clone(),
                    format!("relation `{relation}` is not bound to a device"),
                )
            }),
    }
}
