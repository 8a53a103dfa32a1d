//! The scheduler callback interface, one method per event kind.

use gasc_core::{ExecutorId, Offer, OfferId, SchedulerEvent, SlaveId, TaskStatus};

use crate::driver::SchedulerDriver;
use crate::tool::ToolReport;

pub trait Scheduler {
    fn registered(&mut self, driver: &mut dyn SchedulerDriver, framework_id: &str, master: &str);

    fn reregistered(&mut self, driver: &mut dyn SchedulerDriver, master: &str);

    fn disconnected(&mut self, driver: &mut dyn SchedulerDriver);

    fn resource_offers(&mut self, driver: &mut dyn SchedulerDriver, offers: &[Offer]);

    fn offer_rescinded(&mut self, driver: &mut dyn SchedulerDriver, offer_id: &OfferId);

    fn status_update(&mut self, driver: &mut dyn SchedulerDriver, status: &TaskStatus);

    fn framework_message(
        &mut self,
        driver: &mut dyn SchedulerDriver,
        executor_id: &ExecutorId,
        slave_id: &SlaveId,
        data: &str,
    );

    fn slave_lost(&mut self, driver: &mut dyn SchedulerDriver, slave_id: &SlaveId);

    fn executor_lost(
        &mut self,
        driver: &mut dyn SchedulerDriver,
        executor_id: &ExecutorId,
        slave_id: &SlaveId,
        status: i32,
    );

    fn error(&mut self, driver: &mut dyn SchedulerDriver, message: &str);

    /// The tool worker finished (or failed to start) the external tool.
    fn tool_finished(&mut self, driver: &mut dyn SchedulerDriver, report: ToolReport);

    /// The event stream ended without the scheduler stopping the driver.
    fn connection_closed(&mut self, driver: &mut dyn SchedulerDriver);
}

/// Route one driver event to the matching callback.
pub fn dispatch<S: Scheduler + ?Sized>(
    scheduler: &mut S,
    driver: &mut dyn SchedulerDriver,
    event: SchedulerEvent,
) {
    match event {
        SchedulerEvent::Registered {
            framework_id,
            master,
        } => scheduler.registered(driver, &framework_id, &master),
        SchedulerEvent::Reregistered { master } => scheduler.reregistered(driver, &master),
        SchedulerEvent::Disconnected => scheduler.disconnected(driver),
        SchedulerEvent::ResourceOffers { offers } => scheduler.resource_offers(driver, &offers),
        SchedulerEvent::OfferRescinded { offer_id } => scheduler.offer_rescinded(driver, &offer_id),
        SchedulerEvent::StatusUpdate(status) => scheduler.status_update(driver, &status),
        SchedulerEvent::FrameworkMessage {
            executor_id,
            slave_id,
            data,
        } => scheduler.framework_message(driver, &executor_id, &slave_id, &data),
        SchedulerEvent::SlaveLost { slave_id } => scheduler.slave_lost(driver, &slave_id),
        SchedulerEvent::ExecutorLost {
            executor_id,
            slave_id,
            status,
        } => scheduler.executor_lost(driver, &executor_id, &slave_id, status),
        SchedulerEvent::Error { message } => scheduler.error(driver, &message),
    }
}
