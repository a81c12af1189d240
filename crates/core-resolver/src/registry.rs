// Copyright Operon, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::collections::HashMap;
use std::sync::Arc;

use elsa::sync::FrozenMap;
use thiserror::Error;

use common::env_const::OPERON_LIVE_UPDATE;
use core_model::{MethodDescriptor, SchemaMap};
use operon_env::Environment;

use crate::plugin::method_handler::{MethodHandler, MethodProvider};

#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("Duplicate method name: {0}")]
    DuplicateMethod(String),

    #[error("Provider {provider} failed to enumerate methods: {message}")]
    Provider {
        provider: &'static str,
        message: String,
    },
}

/// Inventory of every declared operation. Built once at startup from the
/// registered providers; the name-keyed handler map is eager (dispatch is a
/// flat string lookup, matching the wire protocol's own addressing), while
/// descriptor lists are memoized per provider behind a write-once cache.
///
/// With `OPERON_LIVE_UPDATE` enabled, descriptor listing re-enumerates the
/// providers on every call (live editing during development); dispatch is
/// unaffected.
pub struct MethodRegistry {
    providers: Vec<Box<dyn MethodProvider>>,
    handlers: HashMap<String, Arc<dyn MethodHandler>>,
    schemas: SchemaMap,
    descriptor_cache: FrozenMap<&'static str, Box<Vec<MethodDescriptor>>>,
    live_update: bool,
}

impl MethodRegistry {
    pub fn build(
        providers: Vec<Box<dyn MethodProvider>>,
        env: &dyn Environment,
    ) -> Result<Self, RegistryError> {
        let mut handlers: HashMap<String, Arc<dyn MethodHandler>> = HashMap::new();
        let mut schemas = SchemaMap::new();

        for provider in &providers {
            for handler in provider.methods()? {
                let name = handler.descriptor().name;
                if handlers.insert(name.clone(), handler).is_some() {
                    return Err(RegistryError::DuplicateMethod(name));
                }
            }
            schemas.merge(provider.schemas());
        }

        let live_update = env.enabled(OPERON_LIVE_UPDATE, false).unwrap_or(false);

        Ok(Self {
            providers,
            handlers,
            schemas,
            descriptor_cache: FrozenMap::new(),
            live_update,
        })
    }

    /// All method descriptors, in provider registration order. A provider
    /// failure is fatal for the whole load (no partial discovery).
    pub fn load(&self) -> Result<Vec<MethodDescriptor>, RegistryError> {
        let mut all = Vec::with_capacity(self.handlers.len());

        for provider in &self.providers {
            if self.live_update {
                for handler in provider.methods()? {
                    all.push(handler.descriptor());
                }
            } else {
                let cached = match self.descriptor_cache.get(provider.id()) {
                    Some(descriptors) => descriptors,
                    None => {
                        // A concurrent first load may recompute this; the
                        // duplicate work is idempotent and tolerated.
                        let descriptors: Vec<_> = provider
                            .methods()?
                            .iter()
                            .map(|handler| handler.descriptor())
                            .collect();
                        self.descriptor_cache
                            .insert(provider.id(), Box::new(descriptors))
                    }
                };
                all.extend(cached.iter().cloned());
            }
        }

        Ok(all)
    }

    /// Descriptors narrowed by tag intersection and/or exact name match.
    pub fn load_with_filter(
        &self,
        tags: &[String],
        name: Option<&str>,
    ) -> Result<Vec<MethodDescriptor>, RegistryError> {
        Ok(self
            .load()?
            .into_iter()
            .filter(|descriptor| tags.is_empty() || descriptor.has_any_tag(tags))
            .filter(|descriptor| name.is_none_or(|n| descriptor.name == n))
            .collect())
    }

    pub fn named_schemas(&self) -> &SchemaMap {
        &self.schemas
    }

    pub fn lookup(&self, name: &str) -> Option<&Arc<dyn MethodHandler>> {
        self.handlers.get(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use common::context::RequestContext;
    use core_model::{ResultDescriptor, RpcTypeSchema};
    use operon_env::MapEnvironment;
    use serde_json::Value;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct NoopHandler {
        name: &'static str,
        tags: Vec<&'static str>,
    }

    #[async_trait]
    impl MethodHandler for NoopHandler {
        fn descriptor(&self) -> MethodDescriptor {
            let mut descriptor = MethodDescriptor::new(
                self.name,
                ResultDescriptor::new(RpcTypeSchema::scalar("Boolean")),
            );
            for tag in &self.tags {
                descriptor = descriptor.with_tag(*tag);
            }
            descriptor
        }

        async fn invoke(
            &self,
            _args: crate::ResolvedArguments,
            _request_context: &RequestContext<'_>,
        ) -> Result<Value, crate::MethodError> {
            Ok(Value::Bool(true))
        }
    }

    struct CountingProvider {
        scans: Arc<AtomicUsize>,
    }

    impl MethodProvider for CountingProvider {
        fn id(&self) -> &'static str {
            "counting"
        }

        fn methods(&self) -> Result<Vec<Arc<dyn MethodHandler>>, RegistryError> {
            self.scans.fetch_add(1, Ordering::SeqCst);
            Ok(vec![
                Arc::new(NoopHandler {
                    name: "events.rewards.getCountryList",
                    tags: vec!["rewards"],
                }),
                Arc::new(NoopHandler {
                    name: "hr.staff.ping",
                    tags: vec!["hr"],
                }),
            ])
        }

        fn schemas(&self) -> SchemaMap {
            SchemaMap::new()
        }
    }

    fn registry(env: MapEnvironment) -> (MethodRegistry, Arc<AtomicUsize>) {
        let scans = Arc::new(AtomicUsize::new(0));
        let provider = CountingProvider {
            scans: scans.clone(),
        };
        (
            MethodRegistry::build(vec![Box::new(provider)], &env).unwrap(),
            scans,
        )
    }

    #[test]
    fn load_is_memoized_in_production() {
        let (registry, scans) = registry(MapEnvironment::new());
        let build_scans = scans.load(Ordering::SeqCst);

        registry.load().unwrap();
        registry.load().unwrap();

        assert_eq!(scans.load(Ordering::SeqCst), build_scans + 1);
    }

    #[test]
    fn live_update_rescans_every_load() {
        let (registry, scans) = registry(MapEnvironment::from([(OPERON_LIVE_UPDATE, "true")]));
        let build_scans = scans.load(Ordering::SeqCst);

        registry.load().unwrap();
        registry.load().unwrap();

        assert_eq!(scans.load(Ordering::SeqCst), build_scans + 2);
    }

    #[test]
    fn filtering_by_tag_and_name() {
        let (registry, _) = registry(MapEnvironment::new());

        let hr = registry
            .load_with_filter(&["hr".to_string()], None)
            .unwrap();
        assert_eq!(hr.len(), 1);
        assert_eq!(hr[0].name, "hr.staff.ping");

        let exact = registry
            .load_with_filter(&[], Some("events.rewards.getCountryList"))
            .unwrap();
        assert_eq!(exact.len(), 1);

        let none = registry
            .load_with_filter(&["finance".to_string()], None)
            .unwrap();
        assert!(none.is_empty());
    }

    #[test]
    fn duplicate_names_are_fatal() {
        struct DupProvider;
        impl MethodProvider for DupProvider {
            fn id(&self) -> &'static str {
                "dup"
            }
            fn methods(&self) -> Result<Vec<Arc<dyn MethodHandler>>, RegistryError> {
                Ok(vec![
                    Arc::new(NoopHandler {
                        name: "a.b.c",
                        tags: vec![],
                    }),
                    Arc::new(NoopHandler {
                        name: "a.b.c",
                        tags: vec![],
                    }),
                ])
            }
            fn schemas(&self) -> SchemaMap {
                SchemaMap::new()
            }
        }

        let result = MethodRegistry::build(vec![Box::new(DupProvider)], &MapEnvironment::new());
        assert!(matches!(result, Err(RegistryError::DuplicateMethod(_))));
    }
}
