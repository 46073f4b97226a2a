#![allow(dead_code)]

mod fixtures;
pub use fixtures::*;

use image::DynamicImage;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

use symscan::{BoundingBox, DetectedSymbol, SymbolDecoder, Symbology};

#[derive(Default)]
struct Script {
    responses: Vec<Vec<DetectedSymbol>>,
    calls: Cell<usize>,
    accepted_sets: RefCell<Vec<Vec<Symbology>>>,
    image_sizes: RefCell<Vec<(u32, u32)>>,
}

/// Fake engine answering the n-th decode call with the n-th scripted
/// response (empty once the script runs out).
///
/// Clones share state, so a test can keep one handle and give the other
/// to a recognizer.
#[derive(Clone, Default)]
pub struct ScriptedDecoder {
    script: Rc<Script>,
}

impl ScriptedDecoder {
    pub fn new(responses: Vec<Vec<DetectedSymbol>>) -> Self {
        Self {
            script: Rc::new(Script {
                responses,
                ..Default::default()
            }),
        }
    }

    pub fn calls(&self) -> usize {
        self.script.calls.get()
    }

    pub fn accepted_sets(&self) -> Vec<Vec<Symbology>> {
        self.script.accepted_sets.borrow().clone()
    }

    pub fn image_sizes(&self) -> Vec<(u32, u32)> {
        self.script.image_sizes.borrow().clone()
    }
}

impl SymbolDecoder for ScriptedDecoder {
    fn decode(&self, image: &DynamicImage, accepted: &[Symbology]) -> Vec<DetectedSymbol> {
        let call = self.script.calls.get();
        self.script.calls.set(call + 1);
        self.script.accepted_sets.borrow_mut().push(accepted.to_vec());
        self.script.image_sizes.borrow_mut().push((image.width(), image.height()));
        self.script.responses.get(call).cloned().unwrap_or_default()
    }
}

pub fn sample_bbox() -> BoundingBox {
    BoundingBox::new(10, 12, 80, 40)
}

pub fn ean13_symbol(code: &str) -> DetectedSymbol {
    DetectedSymbol::new(code.as_bytes().to_vec(), Symbology::Ean13, sample_bbox())
}

pub fn datamatrix_symbol(payload: &str, bbox: BoundingBox) -> DetectedSymbol {
    DetectedSymbol::new(payload.as_bytes().to_vec(), Symbology::DataMatrix, bbox)
}
