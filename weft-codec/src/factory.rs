// SPDX-FileCopyrightText: 2026 Weft contributors
// SPDX-License-Identifier: MIT

//! Builds converters and memoises them per shape.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, OnceLock, PoisonError, RwLock};

use tracing::debug;

use crate::convert::{
    Converter, FieldConverter, MapConverter, NullableConverter, ObjectConverter, ObjectLayout,
    PayloadKind, SequenceConverter, SequenceKind, TypeInfoConverter,
};
use crate::error::{CodecError, Result};
use crate::options::CodecOptions;
use crate::shape::{ObjectShape, Shape};
use crate::value::Value;
use crate::wire::WireType;

#[derive(Debug, Default)]
struct Cache {
    converters: HashMap<Shape, Converter>,
    typed: HashMap<Shape, Converter>,
    objects: HashMap<&'static str, &'static ObjectShape>,
}

impl Cache {
    fn merge(&mut self, added: Cache) {
        self.converters.extend(added.converters);
        self.typed.extend(added.typed);
        self.objects.extend(added.objects);
    }
}

/// Converters made by one build, layered over the committed cache.
struct Overlay<'a> {
    base: &'a Cache,
    added: Cache,
}

impl<'a> Overlay<'a> {
    fn new(base: &'a Cache) -> Self {
        Overlay {
            base,
            added: Cache::default(),
        }
    }

    fn converter(&self, shape: &Shape) -> Option<&Converter> {
        self.added
            .converters
            .get(shape)
            .or_else(|| self.base.converters.get(shape))
    }

    fn typed(&self, shape: &Shape) -> Option<&Converter> {
        self.added
            .typed
            .get(shape)
            .or_else(|| self.base.typed.get(shape))
    }

    fn object(&self, name: &str) -> Option<&'static ObjectShape> {
        self.added
            .objects
            .get(name)
            .or_else(|| self.base.objects.get(name))
            .copied()
    }
}

/// Source of converters for one set of [`CodecOptions`].
///
/// Lookups are lock-free apart from a shared read lock. Building takes the
/// write lock and collects new converters in an overlay that is merged into
/// the cache only when the whole build succeeded, so a failed build leaves
/// nothing half set up behind.
#[derive(Debug)]
pub struct ConverterFactory {
    options: CodecOptions,
    cache: RwLock<Cache>,
    skip: Converter,
}

impl ConverterFactory {
    pub fn new(options: CodecOptions) -> Self {
        ConverterFactory {
            options,
            cache: RwLock::default(),
            skip: Converter::TypeInfo(Arc::new(TypeInfoConverter::skipping())),
        }
    }

    /// The process-wide factory for `options`.
    pub fn shared(options: &CodecOptions) -> Arc<ConverterFactory> {
        static FACTORIES: OnceLock<Mutex<HashMap<CodecOptions, Arc<ConverterFactory>>>> =
            OnceLock::new();
        let mut factories = FACTORIES
            .get_or_init(Default::default)
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        factories
            .entry(*options)
            .or_insert_with(|| Arc::new(ConverterFactory::new(*options)))
            .clone()
    }

    pub fn options(&self) -> &CodecOptions {
        &self.options
    }

    /// The converter for `shape`, built on first use.
    pub fn get(&self, shape: &Shape) -> Result<Converter> {
        if let Some(converter) = self.read_cache().converters.get(shape) {
            return Ok(converter.clone());
        }
        self.transaction(|factory, cache| factory.build(shape, cache))
    }

    /// The converter for a shape named by incoming data. Cached converters
    /// are reused; anything else is built for this use only and not kept,
    /// so a peer cannot grow the cache.
    pub fn get_transient(&self, shape: &Shape) -> Result<Converter> {
        let cache = self.read_cache();
        if let Some(converter) = cache.converters.get(shape) {
            return Ok(converter.clone());
        }
        self.build(shape, &mut Overlay::new(&cache))
    }

    pub fn get_for<T: WireType>(&self) -> Result<Converter> {
        self.get(&T::shape())
    }

    /// The converter for an object field of `shape`: wrapped so that it
    /// reads and writes a type descriptor first when property types are
    /// enabled, plain otherwise.
    pub fn get_may_need_type_info(&self, shape: &Shape) -> Result<Converter> {
        if !self.options.include_property_types {
            return self.get(shape);
        }
        if let Some(converter) = self.read_cache().typed.get(shape) {
            return Ok(converter.clone());
        }
        self.transaction(|factory, cache| factory.build_typed(shape, cache))
    }

    /// Builds the converter for `T` so that its object types can be named
    /// by incoming descriptors.
    pub fn register<T: WireType>(&self) -> Result<()> {
        self.get_for::<T>().map(drop)
    }

    /// An object type this factory has built a converter for.
    pub fn lookup_object(&self, name: &str) -> Option<&'static ObjectShape> {
        self.read_cache().objects.get(name).copied()
    }

    /// Reads and discards a field described by its type descriptor.
    pub fn skip_converter(&self) -> &Converter {
        &self.skip
    }

    fn read_cache(&self) -> std::sync::RwLockReadGuard<'_, Cache> {
        self.cache.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn transaction(
        &self,
        build: impl FnOnce(&Self, &mut Overlay<'_>) -> Result<Converter>,
    ) -> Result<Converter> {
        let mut cache = self.cache.write().unwrap_or_else(PoisonError::into_inner);
        let mut overlay = Overlay::new(&cache);
        let converter = build(self, &mut overlay).inspect_err(|error| {
            debug!(%error, "converter build failed, cache left unchanged");
        })?;
        let added = overlay.added;
        cache.merge(added);
        Ok(converter)
    }

    fn build(&self, shape: &Shape, cache: &mut Overlay<'_>) -> Result<Converter> {
        if let Some(converter) = cache.converter(shape) {
            return Ok(converter.clone());
        }
        debug!(%shape, "building converter");
        let converter = match shape {
            Shape::Core(kind) => Converter::Core(*kind),
            Shape::String => Converter::Payload(PayloadKind::Text),
            Shape::Bytes => Converter::Payload(PayloadKind::Binary),
            Shape::Dynamic => Converter::Dynamic,
            Shape::Nullable(inner) => {
                if matches!(**inner, Shape::Nullable(_) | Shape::Dynamic) {
                    return Err(CodecError::UnsupportedShape {
                        shape: shape.clone(),
                        reason: "nested nullable values cannot be told apart on the wire".into(),
                    });
                }
                let inner = self.build(inner, cache)?;
                Converter::Nullable(Arc::new(NullableConverter::new(inner)))
            }
            Shape::Array(element) => self.build_sequence(SequenceKind::Array, element, cache)?,
            Shape::List(element) => self.build_sequence(SequenceKind::List, element, cache)?,
            Shape::Set(element) => self.build_sequence(SequenceKind::Set, element, cache)?,
            Shape::Map(key, value) => {
                let key = self.build(key, cache)?;
                let value = self.build(value, cache)?;
                Converter::Map(Arc::new(MapConverter::new(key, value)))
            }
            Shape::Object(object) => return self.build_object(object, cache),
        };
        cache.added.converters.insert(shape.clone(), converter.clone());
        Ok(converter)
    }

    fn build_sequence(
        &self,
        kind: SequenceKind,
        element: &Shape,
        cache: &mut Overlay<'_>,
    ) -> Result<Converter> {
        let element = self.build(element, cache)?;
        Ok(Converter::Sequence(Arc::new(SequenceConverter::new(
            kind, element,
        ))))
    }

    fn build_typed(&self, shape: &Shape, cache: &mut Overlay<'_>) -> Result<Converter> {
        if let Some(converter) = cache.typed(shape) {
            return Ok(converter.clone());
        }
        let inner = self.build(shape, cache)?;
        let converter = Converter::TypeInfo(Arc::new(TypeInfoConverter::new(inner)?));
        cache.added.typed.insert(shape.clone(), converter.clone());
        Ok(converter)
    }

    /// Inserts the object converter before building its fields, so fields
    /// that lead back to the same type find it in the cache.
    fn build_object(
        &self,
        object: &'static ObjectShape,
        cache: &mut Overlay<'_>,
    ) -> Result<Converter> {
        match cache.object(object.name) {
            Some(known) if !std::ptr::eq(known, object) => {
                return Err(CodecError::UnsupportedShape {
                    shape: Shape::Object(object),
                    reason: "another type is already registered under this name".into(),
                });
            }
            _ => {}
        }
        cache.added.objects.insert(object.name, object);
        let converter = Arc::new(ObjectConverter::new(object));
        cache
            .added
            .converters
            .insert(Shape::Object(object), Converter::Object(converter.clone()));
        converter.set_layout(self.object_layout(object, cache)?);
        Ok(Converter::Object(converter))
    }

    fn object_layout(
        &self,
        object: &'static ObjectShape,
        cache: &mut Overlay<'_>,
    ) -> Result<ObjectLayout> {
        let declared = object.fields();
        for (at, field) in declared.iter().enumerate() {
            if declared[..at].iter().any(|other| other.name == field.name) {
                return Err(CodecError::UnsupportedShape {
                    shape: Shape::Object(object),
                    reason: format!("field {} is declared twice", field.name),
                });
            }
        }
        let mut order: Vec<usize> = (0..declared.len()).collect();
        if !self.options.ignore_index_attribute {
            order.sort_by_key(|&slot| declared[slot].index.unwrap_or(u16::MAX));
        }
        let mut wire = Vec::with_capacity(order.len());
        for slot in order {
            let field = &declared[slot];
            let converter = if self.options.include_property_types {
                self.build_typed(&field.shape, cache)?
            } else {
                self.build(&field.shape, cache)?
            };
            wire.push(FieldConverter {
                name: field.name,
                name_value: Value::String(field.name.to_owned()),
                slot,
                converter,
            });
        }
        debug!(
            object = object.name,
            order = ?wire.iter().map(|field| field.name).collect::<Vec<_>>(),
            "object layout"
        );
        let skip = self
            .options
            .include_property_types
            .then(|| self.skip_converter().clone());
        Ok(ObjectLayout::new(
            declared,
            wire,
            self.options.use_property_names,
            skip,
        ))
    }
}
