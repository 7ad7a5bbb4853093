use crate::error::CellEqError;
use crate::nn::layers::{Linear, ReLU};
use crate::nn::module::Module;
use crate::nn::parameter::Parameter;
use rand::Rng;
use std::collections::BTreeMap;

/// Container that chains modules, feeding each output into the next module.
#[derive(Debug, Default)]
pub struct Sequential {
    modules: Vec<Box<dyn Module>>,
    named_modules: BTreeMap<String, usize>,
}

impl Sequential {
    pub fn new() -> Self {
        Sequential {
            modules: Vec::new(),
            named_modules: BTreeMap::new(),
        }
    }

    pub fn add_module(&mut self, name: &str, module: Box<dyn Module>) {
        let index = self.modules.len();
        self.modules.push(module);
        if self.named_modules.insert(name.to_string(), index).is_some() {
            log::warn!("Sequential: module name '{}' reused, parameters of the earlier module are no longer named", name);
        }
    }

    pub fn modules_list(&self) -> &[Box<dyn Module>] {
        &self.modules
    }

    /// Builds the two-layer classifier `Linear -> ReLU -> Linear` with seeded
    /// initialisation.
    pub fn classifier<R: Rng + ?Sized>(
        in_features: usize,
        hidden: usize,
        num_classes: usize,
        rng: &mut R,
    ) -> Result<Self, CellEqError> {
        let mut model = Sequential::new();
        model.add_module("0", Box::new(Linear::with_init(in_features, hidden, true, rng)?));
        model.add_module("1", Box::new(ReLU::new()));
        model.add_module("2", Box::new(Linear::with_init(hidden, num_classes, true, rng)?));
        Ok(model)
    }
}

impl Module for Sequential {
    fn forward(&self, input: &[f32]) -> Result<Vec<f32>, CellEqError> {
        let mut current = input.to_vec();
        for module in &self.modules {
            current = module.forward(&current)?;
        }
        Ok(current)
    }

    fn parameters(&self) -> Vec<&Parameter> {
        let mut params = Vec::new();
        for module in &self.modules {
            params.extend(module.parameters());
        }
        params
    }

    fn named_parameters(&self) -> Vec<(String, &Parameter)> {
        let mut params = Vec::new();
        for (name, &index) in &self.named_modules {
            if let Some(module) = self.modules.get(index) {
                for (param_name, param) in module.named_parameters() {
                    params.push((format!("{}.{}", name, param_name), param));
                }
            }
        }
        params
    }

    fn children(&self) -> Vec<&dyn Module> {
        self.modules.iter().map(|m| m.as_ref()).collect()
    }

    fn named_children(&self) -> Vec<(String, &dyn Module)> {
        let mut children_vec = Vec::new();
        for (name, &index) in &self.named_modules {
            if let Some(module) = self.modules.get(index) {
                children_vec.push((name.clone(), module.as_ref()));
            }
        }
        children_vec
    }

    fn modules(&self) -> Vec<&dyn Module> {
        let mut all_modules = vec![self as &dyn Module];
        for module_box in &self.modules {
            all_modules.extend(module_box.modules());
        }
        all_modules
    }
}
