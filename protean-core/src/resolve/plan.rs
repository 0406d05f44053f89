// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

//! The dependency resolver: classification plus the ordered, role-tagged
//! list of nested descriptors one type depends on.

use crate::error::Error;
use crate::model::registry::TypeDef;
use crate::model::shape::{classify, Classified};
use crate::types::{Shape, SlotRole, TypeToken};

pub(crate) struct Plan {
    pub classified: Classified,
    pub slots: Vec<(SlotRole, TypeToken)>,
}

pub(crate) fn plan(def: &TypeDef) -> Result<Plan, Error> {
    let classified = classify(def)?;
    let caps = def.caps()?;
    let slots = match classified {
        Classified::Delegate => vec![(SlotRole::Inner, caps.delegate()?.inner)],
        Classified::Shape(Shape::Primitive(_))
        | Classified::Shape(Shape::Text)
        | Classified::Shape(Shape::Bytes) => vec![],
        Classified::Shape(Shape::Option) => vec![(SlotRole::Inner, caps.option()?.inner)],
        Classified::Shape(Shape::Seq) => vec![(SlotRole::Item, caps.seq()?.item)],
        Classified::Shape(Shape::Map) => {
            let map = caps.map()?;
            vec![(SlotRole::Key, map.key), (SlotRole::Value, map.value)]
        }
        Classified::Shape(Shape::Tuple) => caps
            .tuple()?
            .slots
            .iter()
            .enumerate()
            .map(|(index, ty)| (SlotRole::Field(index as u32), *ty))
            .collect(),
        Classified::Shape(Shape::Struct) => caps
            .strukt()?
            .fields
            .iter()
            .enumerate()
            .map(|(index, field)| (SlotRole::Field(index as u32), field.ty))
            .collect(),
        Classified::Shape(Shape::Union) => caps
            .union_()?
            .variants
            .iter()
            .enumerate()
            .filter_map(|(index, variant)| {
                variant
                    .payload
                    .map(|payload| (SlotRole::Variant(index as u32), payload))
            })
            .collect(),
    };
    Ok(Plan { classified, slots })
}
