//! CID 7464: General Region of Interest Measurement Modifiers.

use super::context_group;

context_group! {
    /// CID 7464: General Region of Interest Measurement Modifiers.
    pub type Cid7464GeneralRegionOfInterestMeasurementModifiers = ContextGroup<RoiMeasurementModifier> {
        identifier: "7464",
        version: "20141110",
        uid: "1.2.840.10008.6.1.1000",
        extensible: true,
        codes: {
            Mean => ("R-00317", "SRT", "Mean"),
            Minimum => ("R-404FB", "SRT", "Minimum"),
            Maximum => ("G-A437", "SRT", "Maximum"),
            Median => ("R-00319", "SRT", "Median"),
            Mode => ("R-0032E", "SRT", "Mode"),
            StandardDeviation => ("R-10047", "SRT", "Standard Deviation"),
            PeakValueWithinRoi => ("126031", "DCM", "Peak Value Within ROI"),
        }
    }
}
