#![forbid(unsafe_code)]

//! Integration test: stack operations emit spans tagged with the dialog id.

use std::sync::{Arc, Mutex};

use modal_harness::ModalFixture;
use modal_widgets::modal::ModalOptions;
use tracing::field::{Field, Visit};
use tracing::span::{Attributes, Id};
use tracing::{Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};

#[derive(Debug, Clone, PartialEq, Eq)]
struct SpanRecord {
    name: &'static str,
    modal_id: Option<u64>,
}

#[derive(Default)]
struct ModalIdVisitor(Option<u64>);

impl Visit for ModalIdVisitor {
    fn record_u64(&mut self, field: &Field, value: u64) {
        if field.name() == "modal_id" {
            self.0 = Some(value);
        }
    }

    fn record_debug(&mut self, _field: &Field, _value: &dyn std::fmt::Debug) {}
}

#[derive(Clone, Default)]
struct SpanCapture {
    spans: Arc<Mutex<Vec<SpanRecord>>>,
    warnings: Arc<Mutex<usize>>,
}

impl<S: Subscriber> Layer<S> for SpanCapture {
    fn on_new_span(&self, attrs: &Attributes<'_>, _id: &Id, _ctx: Context<'_, S>) {
        let mut visitor = ModalIdVisitor::default();
        attrs.record(&mut visitor);
        if let Ok(mut spans) = self.spans.lock() {
            spans.push(SpanRecord {
                name: attrs.metadata().name(),
                modal_id: visitor.0,
            });
        }
    }

    fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        if *event.metadata().level() == Level::WARN
            && let Ok(mut warnings) = self.warnings.lock()
        {
            *warnings += 1;
        }
    }
}

#[test]
fn lifecycle_spans_carry_modal_id() {
    let capture = SpanCapture::default();
    let subscriber = tracing_subscriber::registry().with(capture.clone());

    let (id, failed) = tracing::subscriber::with_default(subscriber, || {
        let mut fx = ModalFixture::new();
        let d = fx.open(ModalOptions::new().template("<p/>"));
        fx.run();
        d.close("done");

        let failed = fx.open(ModalOptions::new().template_url("missing.html"));
        fx.run();
        (d.id().id(), failed.id().id())
    });

    let spans = capture.spans.lock().expect("span log").clone();
    let names_for = |modal_id: u64| -> Vec<&'static str> {
        spans
            .iter()
            .filter(|s| s.modal_id == Some(modal_id))
            .map(|s| s.name)
            .collect()
    };
    assert_eq!(names_for(id), ["modal_resolve", "modal_open", "modal_teardown"]);
    assert_eq!(names_for(failed), ["modal_resolve"]);
    assert_eq!(*capture.warnings.lock().expect("warning count"), 1);
}
