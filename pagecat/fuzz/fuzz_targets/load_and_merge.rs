#![no_main]

use libfuzzer_sys::fuzz_target;
use pagecat::controller::SelectionController;
use pagecat::io::InputFile;
use pagecat::merge::Merger;
use std::sync::OnceLock;
use tokio::runtime::{Builder, Runtime};

static RUNTIME: OnceLock<Runtime> = OnceLock::new();

fn runtime() -> &'static Runtime {
    RUNTIME.get_or_init(|| Builder::new_current_thread().enable_all().build().unwrap())
}

fuzz_target!(|data: &[u8]| {
    runtime().block_on(async {
        let mut controller = SelectionController::new();
        let file = InputFile::pdf("fuzz.pdf", data.to_vec());

        // Arbitrary bytes must either load completely or not at all.
        let Ok(ids) = controller.load_files(vec![file]).await else {
            assert!(controller.session().documents().is_empty());
            return;
        };

        for id in &ids {
            controller.select_all_pages(*id);
        }
        assert!(controller.session().is_consistent());

        let before = controller.view();
        let _ = Merger::new().merge(controller.session(), |_| {}).await;
        assert_eq!(controller.view(), before);
    });
});
