//! The page controller: listeners, stage rendering and request tasks.
//!
//! One [`Controller`] exists per page. Every listener holds an `Rc` to
//! it, so it lives until the page is torn down. Requests are spawned
//! as local tasks; their completions are applied to the mask image in
//! whatever order the server answers.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use demark_control::request::START_LONG_TASK;
use demark_control::{
    ColorFilters, ControllerConfig, Debouncer, Effect, ImageRequest, ImageSource, MaskAction,
    Slider, SliderGroup, StageMachine, ThresholdBounds, Transition,
};
use wasm_bindgen_futures::spawn_local;

use crate::dom::{self, DomError, Page};
use crate::http;
use crate::image::{MaskImage, object_url};
use crate::progress::ProgressSocket;
use crate::timer::TimeoutScheduler;

pub struct Controller {
    page: Page,
    stage: RefCell<StageMachine>,
    mask: MaskImage,
    thresholds: Debouncer<TimeoutScheduler, ThresholdBounds>,
    colors: Debouncer<TimeoutScheduler, ColorFilters>,
    progress: RefCell<Option<ProgressSocket>>,
}

impl Controller {
    /// Bind to the page, attach every listener, open the progress
    /// channel and request the initial threshold mask.
    ///
    /// A progress channel that fails to open is logged and skipped; the
    /// editor works without it.
    ///
    /// # Errors
    ///
    /// Returns a [`DomError`] if the page does not match the element
    /// contract or a listener cannot be attached.
    pub fn start(
        document: &web_sys::Document,
        config: &ControllerConfig,
    ) -> Result<Rc<Self>, DomError> {
        let page = Page::bind(document)?;
        let controller = Rc::new_cyclic(|weak| Self::new(page, config, weak));
        log::debug!(
            "debouncing threshold updates by {:?}, color updates by {:?}",
            controller.thresholds.wait(),
            controller.colors.wait()
        );

        controller.attach_listeners()?;

        match ProgressSocket::open(config, controller.page.progress_bar().clone()) {
            Ok(socket) => *controller.progress.borrow_mut() = Some(socket),
            Err(e) => log::error!("progress channel unavailable: {e}"),
        }

        controller.page.show_value(Slider::ThMin);
        controller.page.show_value(Slider::ThMax);
        controller.send_image(ImageRequest::Thresholds(controller.page.threshold_bounds()));

        Ok(controller)
    }

    fn new(page: Page, config: &ControllerConfig, weak: &Weak<Self>) -> Self {
        let on_thresholds = weak.clone();
        let on_colors = weak.clone();
        Self {
            mask: MaskImage::new(page.mask_image().clone()),
            page,
            stage: RefCell::new(StageMachine::new()),
            thresholds: Debouncer::new(
                TimeoutScheduler,
                config.threshold_debounce(),
                move |bounds: ThresholdBounds| {
                    if let Some(controller) = on_thresholds.upgrade() {
                        controller.send_image(ImageRequest::Thresholds(bounds));
                    }
                },
            ),
            colors: Debouncer::new(
                TimeoutScheduler,
                config.color_debounce(),
                move |filters: ColorFilters| {
                    if let Some(controller) = on_colors.upgrade() {
                        controller.send_image(ImageRequest::ColorFilters(filters));
                    }
                },
            ),
            progress: RefCell::new(None),
        }
    }

    fn attach_listeners(self: &Rc<Self>) -> Result<(), DomError> {
        for slider in Slider::ALL {
            if let Some(input) = self.page.slider_input(slider) {
                let this = Rc::clone(self);
                dom::listen(input, "input", move |_| this.on_slider_input(slider))?;
            }
        }

        let this = Rc::clone(self);
        dom::listen(self.page.mode_select(), "change", move |_| {
            this.colors.call(this.page.color_filters());
        })?;

        let this = Rc::clone(self);
        dom::listen(self.page.done_button(), "click", move |_| this.on_done())?;

        for action in MaskAction::ALL {
            if let Some(button) = self.page.mask_button(action) {
                let this = Rc::clone(self);
                dom::listen(button, "click", move |_| this.on_mask_action(action))?;
            }
        }

        let this = Rc::clone(self);
        dom::listen(self.page.start_button(), "click", move |_| this.on_start())?;

        Ok(())
    }

    fn render(&self) {
        let Some(layout) = self.stage.borrow().layout() else {
            return;
        };
        if let Err(e) = self.page.render(&layout) {
            log::error!("failed to render stage layout: {e}");
        }
    }

    /// Labels follow the slider immediately; the request is debounced.
    fn on_slider_input(self: &Rc<Self>, slider: Slider) {
        self.page.show_value(slider);
        match slider.group() {
            SliderGroup::Threshold => self.thresholds.call(self.page.threshold_bounds()),
            SliderGroup::Color => self.colors.call(self.page.color_filters()),
        }
    }

    fn on_done(self: &Rc<Self>) {
        let transition = self.stage.borrow_mut().done();
        match transition {
            Transition::Advanced { from, to } => log::info!("{from} done, entering {to}"),
            Transition::LaunchReady { first: true } => {
                log::info!("color filtering done, ready to launch");
            }
            Transition::LaunchReady { first: false } => log::debug!("color filtering already done"),
        }
        self.render();

        for effect in transition.effects() {
            match effect {
                Effect::SendColorFilters => {
                    self.send_image(ImageRequest::ColorFilters(self.page.color_filters()));
                }
            }
        }
    }

    fn on_mask_action(self: &Rc<Self>, action: MaskAction) {
        if !self.stage.borrow().accepts_mask_actions() {
            log::debug!("ignoring {action} outside erode/dilate");
            return;
        }

        let ticket = self.mask.begin();
        let this = Rc::clone(self);
        spawn_local(async move {
            let result = http::post_for_ack(action.endpoint())
                .await
                .map(|_| ImageSource::Endpoint(action.refresh_endpoint().to_owned()));
            this.mask.complete(ticket, result, action.endpoint());
        });
    }

    fn on_start(&self) {
        if !self.stage.borrow().launch_ready() {
            log::debug!("ignoring start before color filtering is done");
            return;
        }

        spawn_local(async {
            match http::post_empty(START_LONG_TASK).await {
                Ok(()) => log::info!("background task started"),
                Err(e) => log::error!("{START_LONG_TASK} failed: {e}"),
            }
        });
    }

    /// Post `request` and show the returned image.
    fn send_image(self: &Rc<Self>, request: ImageRequest) {
        let ticket = self.mask.begin();
        let this = Rc::clone(self);
        spawn_local(async move {
            let result = http::post_for_image(&request)
                .await
                .and_then(|blob| object_url(&blob));
            this.mask.complete(ticket, result, request.endpoint());
        });
    }
}
