//! Structural introspection: field plans for structured values
//!
//! A structured value opts into mapping by implementing [`Document`] and
//! registering its fields on a [`ShapeBuilder`]. The builder turns those
//! registrations into a [`ShapePlan`]: an ordered list of
//! [`FieldDescriptor`]s, each holding the field name, its declared
//! [`FieldKind`], and type-erased read/write functions.
//!
//! ## Plan cache
//!
//! Plans are built once per type and cached process-wide, keyed by
//! `TypeId`. A plan is immutable once built. Two threads racing to build
//! the same plan both produce identical plans, and whichever insert lands
//! last wins.
//!
//! ## Exclusion
//!
//! A field registered with only a getter or only a setter is excluded from
//! the plan and recorded in [`ShapePlan::excluded`]. It is never read on
//! encode nor written on decode.
//!
//! ## Recursion
//!
//! Nested shapes are planned eagerly while the outer plan is built. A
//! per-thread stack of shapes under construction detects a shape that
//! reaches itself, which fails with `UnsupportedShape` instead of looping.

use dashmap::DashMap;
use docmap_core::{Error, MapValue, Result, Value, FIELD_PATH_SEPARATOR};
use once_cell::sync::Lazy;
use std::any::{type_name, Any, TypeId};
use std::cell::RefCell;
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use tracing::debug;

use crate::decode::{decode_with_plan, DecodeOptions};
use crate::encode::encode_with_plan;
use crate::field::{FieldKind, FieldValue};

/// A structured value that maps to and from a document
///
/// `Default` is the no-argument construction path used by the decoder:
/// fields absent from a stored document keep their default value.
///
/// # Examples
///
/// ```
/// use docmap_mapper::{Document, ShapeBuilder};
///
/// #[derive(Debug, Default, PartialEq)]
/// struct City {
///     name: String,
///     population: i64,
/// }
///
/// impl Document for City {
///     fn describe(shape: &mut ShapeBuilder<Self>) {
///         shape
///             .field("name", |c| &c.name, |c| &mut c.name)
///             .field("population", |c| &c.population, |c| &mut c.population);
///     }
/// }
/// ```
pub trait Document: Default + Send + Sync + 'static {
    /// Register the fields of this shape
    fn describe(shape: &mut ShapeBuilder<Self>);
}

type ReadFn<T> = Box<dyn Fn(&T) -> Result<Value> + Send + Sync>;
type WriteFn<T> = Box<dyn Fn(&mut T, Value, &DecodeOptions) -> Result<()> + Send + Sync>;

/// One mapped field of a shape
pub struct FieldDescriptor<T> {
    name: String,
    kind: FieldKind,
    read: ReadFn<T>,
    write: WriteFn<T>,
}

impl<T> FieldDescriptor<T> {
    /// Field name as stored in the document
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared kind
    pub fn kind(&self) -> &FieldKind {
        &self.kind
    }

    /// Read the field from an instance and convert it to a value
    pub fn read(&self, instance: &T) -> Result<Value> {
        (self.read)(instance)
    }

    /// Convert a stored value and write it into an instance
    pub fn write(&self, instance: &mut T, value: Value, options: &DecodeOptions) -> Result<()> {
        (self.write)(instance, value, options)
    }
}

impl<T> std::fmt::Debug for FieldDescriptor<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldDescriptor")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .finish()
    }
}

/// A field left out of the plan because it lacks a getter or a setter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExcludedField {
    /// Field name
    pub name: String,
    /// Which half is missing
    pub reason: &'static str,
}

/// Immutable field plan of one shape
pub struct ShapePlan<T> {
    shape: &'static str,
    fields: Vec<FieldDescriptor<T>>,
    excluded: Vec<ExcludedField>,
}

impl<T> ShapePlan<T> {
    /// Type name of the shape
    pub fn shape_name(&self) -> &'static str {
        self.shape
    }

    /// Mapped fields in registration order
    pub fn fields(&self) -> &[FieldDescriptor<T>] {
        &self.fields
    }

    /// Look up a mapped field by name
    pub fn field(&self, name: &str) -> Option<&FieldDescriptor<T>> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Fields excluded for lacking a getter or setter, in registration order
    pub fn excluded(&self) -> &[ExcludedField] {
        &self.excluded
    }

    /// Names of the mapped fields in registration order
    pub fn field_names(&self) -> Vec<&str> {
        self.fields.iter().map(|f| f.name.as_str()).collect()
    }
}

impl<T> std::fmt::Debug for ShapePlan<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShapePlan")
            .field("shape", &self.shape)
            .field("fields", &self.fields)
            .field("excluded", &self.excluded)
            .finish()
    }
}

// =============================================================================
// ShapeBuilder
// =============================================================================

/// Collects field registrations for one shape
///
/// Registration methods chain. The first invalid registration is remembered
/// and reported when the plan is finished; later registrations are ignored.
pub struct ShapeBuilder<T> {
    shape: &'static str,
    fields: Vec<FieldDescriptor<T>>,
    excluded: Vec<ExcludedField>,
    names: HashSet<String>,
    error: Option<Error>,
}

impl<T: 'static> ShapeBuilder<T> {
    fn new() -> Self {
        ShapeBuilder {
            shape: type_name::<T>(),
            fields: Vec::new(),
            excluded: Vec::new(),
            names: HashSet::new(),
            error: None,
        }
    }

    /// Map a field through a pair of reference accessors
    ///
    /// `get` borrows the field for encoding, `get_mut` borrows it for decoding.
    pub fn field<F>(&mut self, name: &str, get: fn(&T) -> &F, get_mut: fn(&mut T) -> &mut F) -> &mut Self
    where
        F: FieldValue + 'static,
    {
        self.push::<F>(
            name,
            F::kind(),
            Box::new(move |t: &T| get(t).to_value()),
            Box::new(move |t: &mut T, v: Value, _: &DecodeOptions| {
                *get_mut(t) = F::from_value(v)?;
                Ok(())
            }),
        )
    }

    /// Map a field through a by-value getter and setter
    ///
    /// For computed properties whose storage differs from the mapped value.
    pub fn property<F>(&mut self, name: &str, get: fn(&T) -> F, set: fn(&mut T, F)) -> &mut Self
    where
        F: FieldValue + 'static,
    {
        self.push::<F>(
            name,
            F::kind(),
            Box::new(move |t: &T| get(t).to_value()),
            Box::new(move |t: &mut T, v: Value, _: &DecodeOptions| {
                set(t, F::from_value(v)?);
                Ok(())
            }),
        )
    }

    /// Map a nested structured value
    pub fn nested<N>(&mut self, name: &str, get: fn(&T) -> &N, get_mut: fn(&mut T) -> &mut N) -> &mut Self
    where
        N: Document,
    {
        let Some(plan) = self.nested_plan::<N>() else {
            return self;
        };
        let read_plan = Arc::clone(&plan);
        self.push::<N>(
            name,
            FieldKind::Nested(type_name::<N>()),
            Box::new(move |t: &T| encode_with_plan(get(t), &read_plan).map(Value::Map)),
            Box::new(move |t: &mut T, v: Value, options: &DecodeOptions| {
                *get_mut(t) = decode_nested(v, &plan, options)?;
                Ok(())
            }),
        )
    }

    /// Map an optional nested structured value
    ///
    /// `None` encodes as `Null`; a stored `Null` decodes to `None`.
    pub fn nested_opt<N>(
        &mut self,
        name: &str,
        get: fn(&T) -> Option<&N>,
        set: fn(&mut T, Option<N>),
    ) -> &mut Self
    where
        N: Document,
    {
        let Some(plan) = self.nested_plan::<N>() else {
            return self;
        };
        let read_plan = Arc::clone(&plan);
        self.push::<N>(
            name,
            FieldKind::Optional(Box::new(FieldKind::Nested(type_name::<N>()))),
            Box::new(move |t: &T| match get(t) {
                Some(inner) => encode_with_plan(inner, &read_plan).map(Value::Map),
                None => Ok(Value::Null),
            }),
            Box::new(move |t: &mut T, v: Value, options: &DecodeOptions| {
                let inner = match v {
                    Value::Null => None,
                    other => Some(decode_nested(other, &plan, options)?),
                };
                set(t, inner);
                Ok(())
            }),
        )
    }

    /// Map a list of nested structured values
    ///
    /// Elements encode in order as maps inside a `Value::Array`. A decode
    /// error inside an element is reported at `name[i]`.
    pub fn nested_list<N>(
        &mut self,
        name: &str,
        get: fn(&T) -> &Vec<N>,
        get_mut: fn(&mut T) -> &mut Vec<N>,
    ) -> &mut Self
    where
        N: Document,
    {
        let Some(plan) = self.nested_plan::<N>() else {
            return self;
        };
        let read_plan = Arc::clone(&plan);
        self.push::<Vec<N>>(
            name,
            FieldKind::Array(Box::new(FieldKind::Nested(type_name::<N>()))),
            Box::new(move |t: &T| {
                get(t)
                    .iter()
                    .map(|item| encode_with_plan(item, &read_plan).map(Value::Map))
                    .collect::<Result<Vec<_>>>()
                    .map(Value::Array)
            }),
            Box::new(move |t: &mut T, v: Value, options: &DecodeOptions| {
                let items = match v {
                    Value::Array(items) => items,
                    other => {
                        return Err(Error::type_mismatch(
                            "",
                            FieldKind::Array(Box::new(FieldKind::Nested(plan.shape_name())))
                                .to_string(),
                            other.type_name(),
                        ))
                    }
                };
                *get_mut(t) = items
                    .into_iter()
                    .enumerate()
                    .map(|(i, item)| {
                        decode_nested(item, &plan, options).map_err(|e| e.within(&format!("[{}]", i)))
                    })
                    .collect::<Result<Vec<_>>>()?;
                Ok(())
            }),
        )
    }

    /// Map a string-keyed map of nested structured values
    ///
    /// A decode error inside an entry is reported at `name.key`.
    pub fn nested_map<N>(
        &mut self,
        name: &str,
        get: fn(&T) -> &BTreeMap<String, N>,
        get_mut: fn(&mut T) -> &mut BTreeMap<String, N>,
    ) -> &mut Self
    where
        N: Document,
    {
        let Some(plan) = self.nested_plan::<N>() else {
            return self;
        };
        let read_plan = Arc::clone(&plan);
        self.push::<BTreeMap<String, N>>(
            name,
            FieldKind::MapOf(Box::new(FieldKind::Nested(type_name::<N>()))),
            Box::new(move |t: &T| {
                let mut out = MapValue::new();
                for (key, item) in get(t) {
                    out.insert(key.clone(), Value::Map(encode_with_plan(item, &read_plan)?));
                }
                Ok(Value::Map(out))
            }),
            Box::new(move |t: &mut T, v: Value, options: &DecodeOptions| {
                let entries = match v {
                    Value::Map(entries) => entries,
                    other => {
                        return Err(Error::type_mismatch(
                            "",
                            FieldKind::MapOf(Box::new(FieldKind::Nested(plan.shape_name())))
                                .to_string(),
                            other.type_name(),
                        ))
                    }
                };
                let mut decoded = BTreeMap::new();
                for (key, item) in entries {
                    let value = decode_nested(item, &plan, options).map_err(|e| e.within(&key))?;
                    decoded.insert(key, value);
                }
                *get_mut(t) = decoded;
                Ok(())
            }),
        )
    }

    /// Record a field that can be read but not written
    ///
    /// The field is excluded from the plan.
    pub fn read_only<F>(&mut self, name: &str, _get: fn(&T) -> F) -> &mut Self {
        self.exclude(name, "no setter")
    }

    /// Record a field that can be written but not read
    ///
    /// The field is excluded from the plan.
    pub fn write_only<F>(&mut self, name: &str, _set: fn(&mut T, F)) -> &mut Self {
        self.exclude(name, "no getter")
    }

    fn exclude(&mut self, name: &str, reason: &'static str) -> &mut Self {
        if self.error.is_none() && self.check_name(name) {
            debug!(shape = self.shape, field = name, reason, "Excluding field from plan");
            self.excluded.push(ExcludedField {
                name: name.to_string(),
                reason,
            });
        }
        self
    }

    fn push<F>(&mut self, name: &str, kind: FieldKind, read: ReadFn<T>, write: WriteFn<T>) -> &mut Self {
        if self.error.is_some() || !self.check_name(name) {
            return self;
        }
        if let Some(reason) = kind.unsupported_reason() {
            self.fail(format!(
                "field '{}' of type {} has no value mapping: {}",
                name,
                type_name::<F>(),
                reason
            ));
            return self;
        }
        self.fields.push(FieldDescriptor {
            name: name.to_string(),
            kind,
            read,
            write,
        });
        self
    }

    fn check_name(&mut self, name: &str) -> bool {
        if name.is_empty() {
            self.fail("field names must not be empty".to_string());
            return false;
        }
        if name.contains(FIELD_PATH_SEPARATOR) {
            self.fail(format!(
                "field name '{}' must not contain '{}'",
                name, FIELD_PATH_SEPARATOR
            ));
            return false;
        }
        if !self.names.insert(name.to_string()) {
            self.fail(format!("field '{}' is registered more than once", name));
            return false;
        }
        true
    }

    fn nested_plan<N: Document>(&mut self) -> Option<Arc<ShapePlan<N>>> {
        if self.error.is_some() {
            return None;
        }
        match plan::<N>() {
            Ok(plan) => Some(plan),
            Err(e) => {
                self.error = Some(e);
                None
            }
        }
    }

    fn fail(&mut self, reason: String) {
        if self.error.is_none() {
            self.error = Some(Error::unsupported_shape(self.shape, reason));
        }
    }

    fn finish(self) -> Result<ShapePlan<T>> {
        if let Some(e) = self.error {
            return Err(e);
        }
        Ok(ShapePlan {
            shape: self.shape,
            fields: self.fields,
            excluded: self.excluded,
        })
    }
}

fn decode_nested<N: Document>(value: Value, plan: &ShapePlan<N>, options: &DecodeOptions) -> Result<N> {
    match value {
        Value::Map(map) => decode_with_plan(&map, plan, options),
        other => Err(Error::type_mismatch(
            "",
            FieldKind::Nested(plan.shape_name()).to_string(),
            other.type_name(),
        )),
    }
}

// =============================================================================
// Plan cache
// =============================================================================

static PLANS: Lazy<DashMap<TypeId, Arc<dyn Any + Send + Sync>>> = Lazy::new(DashMap::new);

thread_local! {
    static BUILDING: RefCell<Vec<(TypeId, &'static str)>> = const { RefCell::new(Vec::new()) };
}

/// Pops the shape off the build stack on every exit path
struct BuildGuard;

impl BuildGuard {
    fn enter(id: TypeId, shape: &'static str) -> Result<Self> {
        BUILDING.with(|stack| {
            let mut stack = stack.borrow_mut();
            if let Some(pos) = stack.iter().position(|(t, _)| *t == id) {
                let cycle: Vec<&str> = stack[pos..]
                    .iter()
                    .map(|(_, name)| *name)
                    .chain(std::iter::once(shape))
                    .collect();
                return Err(Error::unsupported_shape(
                    shape,
                    format!("recursive shape: {}", cycle.join(" -> ")),
                ));
            }
            stack.push((id, shape));
            Ok(BuildGuard)
        })
    }
}

impl Drop for BuildGuard {
    fn drop(&mut self) {
        BUILDING.with(|stack| {
            stack.borrow_mut().pop();
        });
    }
}

/// Get the field plan of a shape, building and caching it on first use
///
/// # Errors
///
/// Returns `UnsupportedShape` if a field has no value mapping, a field name
/// is empty, dotted or duplicated, or the shape reaches itself through
/// nested fields. Failed plans are not cached.
pub fn plan<T: Document>() -> Result<Arc<ShapePlan<T>>> {
    let id = TypeId::of::<T>();
    let cached = PLANS.get(&id).map(|entry| Arc::clone(entry.value()));
    if let Some(any) = cached {
        if let Ok(plan) = any.downcast::<ShapePlan<T>>() {
            return Ok(plan);
        }
    }

    let shape = type_name::<T>();
    let plan = {
        let _guard = BuildGuard::enter(id, shape)?;
        let mut builder = ShapeBuilder::<T>::new();
        T::describe(&mut builder);
        Arc::new(builder.finish()?)
    };
    debug!(
        shape,
        fields = plan.fields.len(),
        excluded = plan.excluded.len(),
        "Built field plan"
    );
    PLANS.insert(id, Arc::clone(&plan) as Arc<dyn Any + Send + Sync>);
    Ok(plan)
}
