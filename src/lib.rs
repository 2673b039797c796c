// Copyright 2025 The Drasi Authors.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Resolve declarative configuration trees.
//!
//! Leaves of a configuration tree may be schema nodes that name an
//! environment variable, a default and an accepted format. [`Config`]
//! resolves them once and then serves flat or dotted-key lookups.

pub mod config;

// Main exports for library users
pub use config::{
    from_json_str, from_yaml_str, load_config_file, save_config_file, Config, ConfigError,
    ConfigInput, Environment, Format, FormatError, ProcessEnvironment, ResolveError,
    SchemaResolver, TypeTag,
};
